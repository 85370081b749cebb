//! # FLAC Metadata Module
//!
//! Tracks are delivered as FLAC files that already carry a small Vorbis
//! comment and a low resolution picture. This module replaces that metadata
//! with the full tag set and the album cover.
//!
//! ```text
//! "fLaC" | STREAMINFO | VORBIS_COMMENT | ... | audio frames
//!                 ↓ write_tags
//! "fLaC" | STREAMINFO | VORBIS_COMMENT' | PICTURE? | audio frames
//! ```
//!
//! Only the metadata region is rewritten. Audio frames are copied over
//! byte for byte from the original file.

mod block;
mod bytes;
mod picture;
mod rewrite;
mod vorbis;

use std::{fmt, io};

pub use block::{BlockType, FlacFile, MAX_BLOCK_LEN, MetadataBlock, MetadataBlocks};
pub use picture::{FRONT_COVER, JPEG_MIME, Picture, jpeg_dimensions};
pub use rewrite::write_tags;
pub use vorbis::VorbisComment;

#[derive(Debug)]
pub enum FlacError {
    IoError(io::Error),
    NotFlac,
    Truncated,
    InvalidBlockType(u8),
    MissingStreamInfo,
    TooFewBlocks(usize),
    UnexpectedBlock(BlockType),
    DuplicateBlock(BlockType),
    BlockTooLarge(usize),
    MalformedComment(String),
    MalformedPicture(String),
    ImageError(image::ImageError),
}

impl fmt::Display for FlacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlacError::IoError(e) => write!(f, "{}", e),
            FlacError::NotFlac => write!(f, "Missing fLaC stream marker."),
            FlacError::Truncated => write!(f, "Metadata block runs past end of file."),
            FlacError::InvalidBlockType(t) => write!(f, "Invalid metadata block type {}.", t),
            FlacError::MissingStreamInfo => write!(f, "First metadata block isn't STREAMINFO."),
            FlacError::TooFewBlocks(n) => {
                write!(f, "Expected at least 2 metadata blocks, found {}.", n)
            }
            FlacError::UnexpectedBlock(t) => write!(f, "Unexpected {:?} block.", t),
            FlacError::DuplicateBlock(t) => write!(f, "Only one {:?} block is allowed.", t),
            FlacError::BlockTooLarge(n) => write!(f, "Metadata block of {} bytes is too large.", n),
            FlacError::MalformedComment(msg) => write!(f, "Malformed Vorbis comment: {}", msg),
            FlacError::MalformedPicture(msg) => write!(f, "Malformed picture: {}", msg),
            FlacError::ImageError(e) => write!(f, "Unreadable artwork: {}", e),
        }
    }
}

impl std::error::Error for FlacError {}

impl From<io::Error> for FlacError {
    fn from(err: io::Error) -> Self {
        FlacError::IoError(err)
    }
}

impl From<image::ImageError> for FlacError {
    fn from(err: image::ImageError) -> Self {
        FlacError::ImageError(err)
    }
}
