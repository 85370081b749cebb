use crate::types::{AlbumDescriptor, TrackDescriptor};

/// Zero-padded track number. Only meant for file name templates and never
/// embedded into the audio file.
pub const TRACK_PAD_KEY: &str = "trackPad";

/// Ordered tag name → value mapping. Names are unique, compared
/// case-insensitively, and keep the spelling of their first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMapping {
    entries: Vec<(String, String)>,
}

impl TagMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Album level fields shared by every track.
    pub fn for_album(album: &AlbumDescriptor) -> Self {
        let mut tags = Self::new();
        tags.insert("album", &album.title);
        tags.insert("albumArtist", &album.artist);
        tags.insert("copyright", &album.copyright);
        tags.insert("upc", &album.upc);
        tags.insert("year", album.year());
        tags
    }

    /// Album fields merged with the track's own fields and its 1-based
    /// position.
    pub fn for_track(
        album_tags: &TagMapping,
        track: &TrackDescriptor,
        track_num: usize,
        track_total: usize,
    ) -> Self {
        let mut tags = album_tags.clone();
        tags.insert("artist", &track.artist);
        tags.insert("genre", &track.genre);
        tags.insert("isrc", &track.isrc);
        tags.insert("title", &track.title);
        tags.insert("track", track_num.to_string());
        tags.insert(TRACK_PAD_KEY, format!("{:02}", track_num));
        tags.insert("trackTotal", track_total.to_string());
        tags
    }

    /// Sets `key`, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fields that belong in the audio file, i.e. everything but
    /// [`TRACK_PAD_KEY`].
    pub fn embedded(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(TRACK_PAD_KEY))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn album() -> AlbumDescriptor {
        AlbumDescriptor {
            id: "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d".to_string(),
            title: "Kind of Blue".to_string(),
            artist: "Miles Davis".to_string(),
            copyright: "(P) 1959 Columbia".to_string(),
            upc: "886445135288".to_string(),
            release_date: Some(Utc.with_ymd_and_hms(1959, 8, 17, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn track() -> TrackDescriptor {
        TrackDescriptor {
            title: "So What".to_string(),
            artist: "Miles Davis".to_string(),
            genre: "Jazz".to_string(),
            isrc: "USSM15900113".to_string(),
            url: "https://example.com/1.flac".to_string(),
            format: "192".to_string(),
        }
    }

    #[test]
    fn test_insert_is_case_insensitive() {
        let mut tags = TagMapping::new();
        tags.insert("Title", "a");
        tags.insert("TITLE", "b");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("title"), Some("b"));
        assert_eq!(tags.iter().next(), Some(("Title", "b")));
    }

    #[test]
    fn test_track_mapping() {
        let album_tags = TagMapping::for_album(&album());
        let tags = TagMapping::for_track(&album_tags, &track(), 3, 12);

        let keys: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "album",
                "albumArtist",
                "copyright",
                "upc",
                "year",
                "artist",
                "genre",
                "isrc",
                "title",
                "track",
                "trackPad",
                "trackTotal"
            ]
        );
        assert_eq!(tags.get("year"), Some("1959"));
        assert_eq!(tags.get("track"), Some("3"));
        assert_eq!(tags.get("trackPad"), Some("03"));
        assert_eq!(tags.get("trackTotal"), Some("12"));

        // album tags stay untouched for the next track
        assert!(album_tags.get("title").is_none());
    }

    #[test]
    fn test_track_pad_not_embedded() {
        let tags = TagMapping::for_track(&TagMapping::for_album(&album()), &track(), 10, 10);
        assert_eq!(tags.get("trackPad"), Some("10"));
        assert!(tags.embedded().all(|(k, _)| k != "trackPad"));
        assert_eq!(tags.embedded().count(), tags.len() - 1);
    }
}
