use std::path::Path;

use crate::{
    flac::{FlacError, FlacFile, Picture, VorbisComment},
    pipeline::TagMapping,
};

/// Replaces the metadata of a downloaded track.
///
/// Afterwards the file holds exactly STREAMINFO, a new Vorbis comment with
/// every embeddable tag (names upper-cased, original vendor string kept) and,
/// when `artwork` is given, a JPEG front cover. Any other block of the
/// original, including its comment and picture, is dropped. Audio frames are
/// left alone.
///
/// The second block of the original has to be its Vorbis comment, anything
/// else fails the rewrite. Nothing is written unless every input is valid.
pub fn write_tags(path: &Path, tags: &TagMapping, artwork: Option<&[u8]>) -> Result<(), FlacError> {
    let mut flac = FlacFile::read(path)?;

    let existing = flac
        .blocks()
        .get(1)
        .ok_or(FlacError::TooFewBlocks(flac.blocks().len()))?;
    let vendor = VorbisComment::read_vendor(existing)?;

    let picture = artwork
        .map(|data| Picture::front_cover_jpeg(data.to_vec()))
        .transpose()?;

    let mut comment = VorbisComment::new(vendor);
    for (key, value) in tags.embedded() {
        comment.add(key.to_uppercase(), value);
    }

    let blocks = flac.blocks_mut();
    blocks.truncate_to_stream_info();
    blocks.push(comment.to_block())?;
    if let Some(picture) = picture {
        blocks.push(picture.to_block())?;
    }

    flac.save(path)
}
