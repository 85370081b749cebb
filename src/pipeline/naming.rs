use std::fmt;

use crate::{
    config::DEFAULT_TRACK_TEMPLATE,
    pipeline::TagMapping,
    types::AlbumDescriptor,
    utils::{sanitize, truncate_chars},
};

pub const ALBUM_FOLDER_MAX_CHARS: usize = 120;
pub const TRACK_EXTENSION: &str = "flac";
pub const COVER_FILE: &str = "cover.jpg";
pub const BOOKLET_FILE: &str = "booklet.pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Unclosed(usize),
    UnknownKey(String),
    Empty,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Unclosed(pos) => write!(f, "Unclosed placeholder at {}.", pos),
            RenderError::UnknownKey(key) => write!(f, "Unknown placeholder {:?}.", key),
            RenderError::Empty => write!(f, "Template rendered to an empty name."),
        }
    }
}

impl std::error::Error for RenderError {}

/// Renders `{{.key}}` placeholders (the leading dot and inner spaces are
/// optional) with values from `tags`.
pub fn render(template: &str, tags: &TagMapping) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or(RenderError::Unclosed(offset + start))?;

        let key = after[..end].trim();
        let key = key.strip_prefix('.').unwrap_or(key);
        let value = tags
            .get(key)
            .ok_or_else(|| RenderError::UnknownKey(key.to_string()))?;
        out.push_str(value);

        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);

    if out.trim().is_empty() {
        return Err(RenderError::Empty);
    }
    Ok(out)
}

/// Renders `template`, or the default template when that fails. The error
/// of the custom template is handed back for reporting.
pub fn render_or_default(template: &str, tags: &TagMapping) -> (String, Option<RenderError>) {
    match render(template, tags) {
        Ok(name) => (name, None),
        Err(e) => {
            let name = render(DEFAULT_TRACK_TEMPLATE, tags).unwrap_or_else(|_| {
                format!(
                    "{}. {}",
                    tags.get("trackPad").unwrap_or_default(),
                    tags.get("title").unwrap_or_default()
                )
            });
            (name, Some(e))
        }
    }
}

/// `"<artist> - <title>"`, cut to [`ALBUM_FOLDER_MAX_CHARS`] and sanitized.
/// The flag tells whether the name had to be cut.
pub fn album_folder(album: &AlbumDescriptor) -> (String, bool) {
    let name = format!("{} - {}", album.artist, album.title);
    let (name, truncated) = truncate_chars(&name, ALBUM_FOLDER_MAX_CHARS);
    (sanitize(&name), truncated)
}

pub fn track_file_name(rendered: &str) -> String {
    format!("{}.{}", sanitize(rendered), TRACK_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagMapping {
        let mut tags = TagMapping::new();
        tags.insert("trackPad", "07");
        tags.insert("title", "Blue in Green");
        tags.insert("artist", "Miles Davis");
        tags
    }

    #[test]
    fn test_render_go_style() {
        assert_eq!(
            render("{{.trackPad}}. {{.title}}", &tags()).unwrap(),
            "07. Blue in Green"
        );
        assert_eq!(
            render("{{ .artist }} - {{title}}", &tags()).unwrap(),
            "Miles Davis - Blue in Green"
        );
        assert_eq!(render("plain", &tags()).unwrap(), "plain");
    }

    #[test]
    fn test_render_errors() {
        assert_eq!(
            render("{{.trackPad}}. {{.title", &tags()),
            Err(RenderError::Unclosed(15))
        );
        assert_eq!(
            render("{{.genre}}", &tags()),
            Err(RenderError::UnknownKey("genre".to_string()))
        );
        assert_eq!(render("  ", &tags()), Err(RenderError::Empty));
    }

    #[test]
    fn test_render_falls_back_to_default() {
        let (name, err) = render_or_default("{{.nope}}", &tags());
        assert_eq!(name, "07. Blue in Green");
        assert!(err.is_some());

        let (name, err) = render_or_default("{{.artist}}", &tags());
        assert_eq!(name, "Miles Davis");
        assert!(err.is_none());
    }

    #[test]
    fn test_album_folder() {
        let album = AlbumDescriptor {
            artist: "AC/DC".to_string(),
            title: "Who Made Who?".to_string(),
            ..Default::default()
        };
        assert_eq!(album_folder(&album), ("AC_DC - Who Made Who_".to_string(), false));
    }

    #[test]
    fn test_album_folder_truncated() {
        let album = AlbumDescriptor {
            artist: "Orchestra".to_string(),
            title: "é".repeat(200),
            ..Default::default()
        };
        let (name, truncated) = album_folder(&album);
        assert!(truncated);
        assert_eq!(name.chars().count(), ALBUM_FOLDER_MAX_CHARS);
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(track_file_name("01. What: Now?"), "01. What_ Now_.flac");
    }
}
