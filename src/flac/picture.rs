use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::flac::{BlockType, FlacError, MetadataBlock, bytes::ByteReader};

/// APIC picture type 3.
pub const FRONT_COVER: u32 = 3;
pub const JPEG_MIME: &str = "image/jpeg";

/// PICTURE block body. Every integer is big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub picture_type: u32,
    pub mime: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub colors: u32,
    pub data: Vec<u8>,
}

impl Picture {
    /// Front cover from JPEG bytes. The dimensions are read from the JPEG
    /// header, so bytes that aren't a decodable JPEG are rejected.
    pub fn front_cover_jpeg(data: Vec<u8>) -> Result<Self, FlacError> {
        let (width, height) = jpeg_dimensions(&data)?;

        Ok(Self {
            picture_type: FRONT_COVER,
            mime: JPEG_MIME.to_string(),
            description: String::new(),
            width,
            height,
            depth: 24,
            colors: 0,
            data,
        })
    }

    pub fn from_block(block: &MetadataBlock) -> Result<Self, FlacError> {
        if block.block_type != BlockType::Picture {
            return Err(FlacError::UnexpectedBlock(block.block_type));
        }
        Self::parse(&block.data)
    }

    pub fn parse(data: &[u8]) -> Result<Self, FlacError> {
        let mut reader = ByteReader::new(data);

        let picture_type = read_u32(&mut reader)?;
        let mime_len = read_u32(&mut reader)? as usize;
        let mime = take_str(&mut reader, mime_len)?;
        let desc_len = read_u32(&mut reader)? as usize;
        let description = take_str(&mut reader, desc_len)?;
        let width = read_u32(&mut reader)?;
        let height = read_u32(&mut reader)?;
        let depth = read_u32(&mut reader)?;
        let colors = read_u32(&mut reader)?;
        let data_len = read_u32(&mut reader)? as usize;
        let data = reader.take(data_len).ok_or_else(past_end)?.to_vec();

        Ok(Self {
            picture_type,
            mime,
            description,
            width,
            height,
            depth,
            colors,
            data,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.mime.len() + self.data.len());
        out.extend_from_slice(&self.picture_type.to_be_bytes());
        out.extend_from_slice(&(self.mime.len() as u32).to_be_bytes());
        out.extend_from_slice(self.mime.as_bytes());
        out.extend_from_slice(&(self.description.len() as u32).to_be_bytes());
        out.extend_from_slice(self.description.as_bytes());
        for value in [self.width, self.height, self.depth, self.colors] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    pub fn to_block(&self) -> MetadataBlock {
        MetadataBlock::new(BlockType::Picture, self.to_bytes())
    }
}

/// Width and height from a JPEG header.
pub fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32), FlacError> {
    let dimensions =
        ImageReader::with_format(Cursor::new(data), ImageFormat::Jpeg).into_dimensions()?;
    Ok(dimensions)
}

fn past_end() -> FlacError {
    FlacError::MalformedPicture("length runs past block end".into())
}

fn read_u32(reader: &mut ByteReader<'_>) -> Result<u32, FlacError> {
    reader.u32_be().ok_or_else(past_end)
}

fn take_str(reader: &mut ByteReader<'_>, len: usize) -> Result<String, FlacError> {
    let bytes = reader.take(len).ok_or_else(past_end)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| FlacError::MalformedPicture("invalid UTF-8 text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_front_cover_reads_dimensions() {
        let data = jpeg(12, 8);
        let picture = Picture::front_cover_jpeg(data.clone()).unwrap();
        assert_eq!(picture.picture_type, FRONT_COVER);
        assert_eq!(picture.mime, JPEG_MIME);
        assert_eq!((picture.width, picture.height), (12, 8));
        assert_eq!(picture.data, data);
    }

    #[test]
    fn test_front_cover_rejects_non_jpeg() {
        let result = Picture::front_cover_jpeg(b"<html>not found</html>".to_vec());
        assert!(matches!(result, Err(FlacError::ImageError(_))));
    }

    #[test]
    fn test_parse_written_block() {
        let picture = Picture::front_cover_jpeg(jpeg(4, 4)).unwrap();
        let parsed = Picture::from_block(&picture.to_block()).unwrap();
        assert_eq!(parsed, picture);
    }

    #[test]
    fn test_parse_rejects_short_body() {
        assert!(matches!(
            Picture::parse(&[0, 0, 0, 3, 0, 0, 0, 10]),
            Err(FlacError::MalformedPicture(_))
        ));
    }
}
