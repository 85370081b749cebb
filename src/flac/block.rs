use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::flac::FlacError;

pub const STREAM_MARKER: &[u8; 4] = b"fLaC";
/// Block lengths are stored in 24 bits.
pub const MAX_BLOCK_LEN: usize = 0xFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    Reserved(u8),
}

impl BlockType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value & 0x7F {
            0 => Some(BlockType::StreamInfo),
            1 => Some(BlockType::Padding),
            2 => Some(BlockType::Application),
            3 => Some(BlockType::SeekTable),
            4 => Some(BlockType::VorbisComment),
            5 => Some(BlockType::CueSheet),
            6 => Some(BlockType::Picture),
            127 => None,
            other => Some(BlockType::Reserved(other)),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            BlockType::StreamInfo => 0,
            BlockType::Padding => 1,
            BlockType::Application => 2,
            BlockType::SeekTable => 3,
            BlockType::VorbisComment => 4,
            BlockType::CueSheet => 5,
            BlockType::Picture => 6,
            BlockType::Reserved(v) => v & 0x7F,
        }
    }
}

/// A metadata block with its body kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    pub block_type: BlockType,
    pub data: Vec<u8>,
}

impl MetadataBlock {
    pub fn new(block_type: BlockType, data: Vec<u8>) -> Self {
        Self { block_type, data }
    }

    fn write_to<W: Write>(&self, writer: &mut W, is_last: bool) -> Result<(), FlacError> {
        let len = self.data.len();
        if len > MAX_BLOCK_LEN {
            return Err(FlacError::BlockTooLarge(len));
        }
        let flag = if is_last { 0x80 } else { 0x00 };
        let len = (len as u32).to_be_bytes();
        writer.write_all(&[flag | self.block_type.to_u8(), len[1], len[2], len[3]])?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

/// Ordered metadata blocks of one file.
///
/// The first block is always STREAMINFO and can neither be removed nor
/// replaced. Blocks appended through [`MetadataBlocks::push`] are checked so
/// that at most one VORBIS_COMMENT and at most one PICTURE block exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlocks {
    blocks: Vec<MetadataBlock>,
}

impl MetadataBlocks {
    pub fn new(stream_info: MetadataBlock) -> Result<Self, FlacError> {
        Self::from_blocks(vec![stream_info])
    }

    pub fn from_blocks(blocks: Vec<MetadataBlock>) -> Result<Self, FlacError> {
        match blocks.first() {
            Some(first) if first.block_type == BlockType::StreamInfo => Ok(Self { blocks }),
            _ => Err(FlacError::MissingStreamInfo),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MetadataBlock> {
        self.blocks.get(index)
    }

    pub fn stream_info(&self) -> &MetadataBlock {
        &self.blocks[0]
    }

    pub fn count(&self, block_type: BlockType) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.block_type == block_type)
            .count()
    }

    /// Drops everything after STREAMINFO.
    pub fn truncate_to_stream_info(&mut self) {
        self.blocks.truncate(1);
    }

    pub fn push(&mut self, block: MetadataBlock) -> Result<(), FlacError> {
        if block.data.len() > MAX_BLOCK_LEN {
            return Err(FlacError::BlockTooLarge(block.data.len()));
        }
        match block.block_type {
            BlockType::StreamInfo => return Err(FlacError::UnexpectedBlock(BlockType::StreamInfo)),
            t @ (BlockType::VorbisComment | BlockType::Picture) if self.count(t) > 0 => {
                return Err(FlacError::DuplicateBlock(t));
            }
            _ => {}
        }
        self.blocks.push(block);
        Ok(())
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FlacError> {
        let last = self.blocks.len() - 1;
        for (i, block) in self.blocks.iter().enumerate() {
            block.write_to(writer, i == last)?;
        }
        Ok(())
    }
}

/// A FLAC file on disk: its metadata blocks and where the audio frames start.
#[derive(Debug)]
pub struct FlacFile {
    path: PathBuf,
    blocks: MetadataBlocks,
    audio_offset: u64,
}

impl FlacFile {
    pub fn read(path: &Path) -> Result<Self, FlacError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let (blocks, audio_offset) = read_metadata(&mut reader)?;
        Ok(Self {
            path: path.to_path_buf(),
            blocks,
            audio_offset,
        })
    }

    pub fn blocks(&self) -> &MetadataBlocks {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut MetadataBlocks {
        &mut self.blocks
    }

    pub fn audio_offset(&self) -> u64 {
        self.audio_offset
    }

    /// Writes the current blocks followed by the untouched audio frames of
    /// the source file to `dest`.
    ///
    /// The new file is assembled next to `dest` and renamed over it, so the
    /// source may be `dest` itself and a failed save leaves it intact.
    pub fn save(&self, dest: &Path) -> Result<(), FlacError> {
        let tmp = temp_path(dest);
        match self.write_file(&tmp) {
            Ok(()) => fs::rename(&tmp, dest).map_err(|e| {
                let _ = fs::remove_file(&tmp);
                FlacError::IoError(e)
            }),
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(e)
            }
        }
    }

    fn write_file(&self, tmp: &Path) -> Result<(), FlacError> {
        let mut source = File::open(&self.path)?;
        source.seek(SeekFrom::Start(self.audio_offset))?;

        let mut writer = BufWriter::new(File::create(tmp)?);
        writer.write_all(STREAM_MARKER)?;
        self.blocks.write_to(&mut writer)?;
        io::copy(&mut source, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Parses the stream marker and every metadata block up to the one flagged
/// as last. Returns the blocks and the offset of the first audio frame.
pub fn read_metadata<R: Read>(reader: &mut R) -> Result<(MetadataBlocks, u64), FlacError> {
    let mut marker = [0u8; 4];
    read_exact(reader, &mut marker)?;
    if &marker != STREAM_MARKER {
        return Err(FlacError::NotFlac);
    }

    let mut offset: u64 = 4;
    let mut blocks = Vec::new();
    loop {
        let mut header = [0u8; 4];
        read_exact(reader, &mut header)?;
        let is_last = header[0] & 0x80 != 0;
        let block_type =
            BlockType::from_u8(header[0]).ok_or(FlacError::InvalidBlockType(header[0] & 0x7F))?;
        let len = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;

        let mut data = vec![0u8; len];
        read_exact(reader, &mut data)?;
        offset += 4 + len as u64;
        blocks.push(MetadataBlock::new(block_type, data));

        if is_last {
            break;
        }
    }

    Ok((MetadataBlocks::from_blocks(blocks)?, offset))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FlacError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FlacError::Truncated,
        _ => FlacError::IoError(e),
    })
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut path = dest.as_os_str().to_owned();
    path.push(".tagging");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_info() -> MetadataBlock {
        MetadataBlock::new(BlockType::StreamInfo, vec![7u8; 34])
    }

    #[test]
    fn test_block_type_codes() {
        for code in 0..=6u8 {
            let t = BlockType::from_u8(code).unwrap();
            assert_eq!(t.to_u8(), code);
        }
        assert_eq!(BlockType::from_u8(0x84), Some(BlockType::VorbisComment));
        assert_eq!(BlockType::from_u8(9), Some(BlockType::Reserved(9)));
        assert_eq!(BlockType::from_u8(127), None);
    }

    #[test]
    fn test_first_block_must_be_stream_info() {
        let comment = MetadataBlock::new(BlockType::VorbisComment, vec![]);
        assert!(matches!(
            MetadataBlocks::from_blocks(vec![comment]),
            Err(FlacError::MissingStreamInfo)
        ));
        assert!(matches!(
            MetadataBlocks::from_blocks(vec![]),
            Err(FlacError::MissingStreamInfo)
        ));
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut blocks = MetadataBlocks::new(stream_info()).unwrap();
        blocks
            .push(MetadataBlock::new(BlockType::VorbisComment, vec![1]))
            .unwrap();
        blocks
            .push(MetadataBlock::new(BlockType::Picture, vec![2]))
            .unwrap();
        blocks
            .push(MetadataBlock::new(BlockType::Padding, vec![0; 8]))
            .unwrap();

        assert!(matches!(
            blocks.push(MetadataBlock::new(BlockType::VorbisComment, vec![])),
            Err(FlacError::DuplicateBlock(BlockType::VorbisComment))
        ));
        assert!(matches!(
            blocks.push(MetadataBlock::new(BlockType::Picture, vec![])),
            Err(FlacError::DuplicateBlock(BlockType::Picture))
        ));
        assert!(matches!(
            blocks.push(stream_info()),
            Err(FlacError::UnexpectedBlock(BlockType::StreamInfo))
        ));
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn test_truncate_keeps_stream_info() {
        let mut blocks = MetadataBlocks::new(stream_info()).unwrap();
        blocks
            .push(MetadataBlock::new(BlockType::VorbisComment, vec![1, 2, 3]))
            .unwrap();
        blocks.truncate_to_stream_info();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.stream_info(), &stream_info());
    }

    #[test]
    fn test_read_metadata_offsets() {
        let mut bytes = STREAM_MARKER.to_vec();
        bytes.extend_from_slice(&[0x00, 0, 0, 34]);
        bytes.extend_from_slice(&[7u8; 34]);
        bytes.extend_from_slice(&[0x81, 0, 0, 4]);
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.extend_from_slice(b"AUDIO");

        let (blocks, offset) = read_metadata(&mut bytes.as_slice()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.get(1).unwrap().block_type, BlockType::Padding);
        assert_eq!(offset as usize, bytes.len() - 5);
    }

    #[test]
    fn test_read_metadata_rejects_garbage() {
        assert!(matches!(
            read_metadata(&mut b"ID3\x04".as_slice()),
            Err(FlacError::NotFlac)
        ));

        let mut short = STREAM_MARKER.to_vec();
        short.extend_from_slice(&[0x80, 0, 0, 34, 1, 2]);
        assert!(matches!(
            read_metadata(&mut short.as_slice()),
            Err(FlacError::Truncated)
        ));
    }
}
