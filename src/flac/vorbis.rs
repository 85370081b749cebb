use crate::flac::{BlockType, FlacError, MetadataBlock, bytes::ByteReader};

/// Vorbis comment block body: a vendor string and `KEY=value` pairs.
/// All lengths are little-endian, unlike the rest of FLAC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VorbisComment {
    pub vendor: String,
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            comments: Vec::new(),
        }
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.comments.push((key.into(), value.into()));
    }

    /// Values of a field. Field names compare case-insensitively.
    pub fn get(&self, key: &str) -> Vec<&str> {
        self.comments
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn from_block(block: &MetadataBlock) -> Result<Self, FlacError> {
        if block.block_type != BlockType::VorbisComment {
            return Err(FlacError::UnexpectedBlock(block.block_type));
        }
        Self::parse(&block.data)
    }

    /// Vendor string of a comment block. Entries are only length-checked,
    /// so malformed or non UTF-8 entries don't matter here.
    pub fn read_vendor(block: &MetadataBlock) -> Result<String, FlacError> {
        if block.block_type != BlockType::VorbisComment {
            return Err(FlacError::UnexpectedBlock(block.block_type));
        }

        let mut reader = ByteReader::new(&block.data);
        let vendor = read_string(&mut reader)?;
        let count = reader.u32_le().ok_or_else(past_end)?;
        for _ in 0..count {
            let len = reader.u32_le().ok_or_else(past_end)? as usize;
            reader.take(len).ok_or_else(past_end)?;
        }
        Ok(vendor)
    }

    pub fn parse(data: &[u8]) -> Result<Self, FlacError> {
        let mut reader = ByteReader::new(data);

        let vendor = read_string(&mut reader)?;
        let count = reader.u32_le().ok_or_else(past_end)?;
        let mut comments = Vec::new();
        for _ in 0..count {
            let entry = read_string(&mut reader)?;
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| FlacError::MalformedComment(format!("no '=' in {:?}", entry)))?;
            comments.push((key.to_string(), value.to_string()));
        }

        Ok(Self { vendor, comments })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_string(&mut out, &self.vendor);
        out.extend_from_slice(&(self.comments.len() as u32).to_le_bytes());
        for (key, value) in &self.comments {
            push_string(&mut out, &format!("{}={}", key, value));
        }
        out
    }

    pub fn to_block(&self) -> MetadataBlock {
        MetadataBlock::new(BlockType::VorbisComment, self.to_bytes())
    }
}

fn push_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn past_end() -> FlacError {
    FlacError::MalformedComment("length runs past block end".into())
}

fn read_string(reader: &mut ByteReader<'_>) -> Result<String, FlacError> {
    let len = reader.u32_le().ok_or_else(past_end)? as usize;
    let bytes = reader.take(len).ok_or_else(past_end)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| FlacError::MalformedComment("invalid UTF-8".into()))
}
