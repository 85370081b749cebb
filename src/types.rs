use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Login response of the catalog. Re-serialized verbatim as the `userData`
/// query parameter of every metadata request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub response_status: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub has_subscription: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub hasfilter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumMetaResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub response_status: String,
    /// Absent on unsuccessful responses.
    #[serde(default)]
    pub data: Option<AlbumData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumData {
    pub results: AlbumDescriptor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDescriptor {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub upc: String,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub booklet: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackDescriptor>,
    #[serde(default)]
    pub cover: Option<CoverArt>,
}

impl AlbumDescriptor {
    pub fn year(&self) -> String {
        self.release_date
            .map(|d| d.year().to_string())
            .unwrap_or_default()
    }

    pub fn booklet_url(&self) -> Option<&str> {
        self.booklet.as_deref().filter(|b| !b.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub isrc: String,
    pub url: String,
    /// Sample rate label in kHz, e.g. `"96"`. Bit depth isn't provided.
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverArt {
    #[serde(default)]
    pub master: CoverFile,
    #[serde(default)]
    pub preview: CoverFile,
}

impl CoverArt {
    pub fn select(&self, max_size: bool) -> &str {
        if max_size {
            &self.master.file_url
        } else {
            &self.preview.file_url
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverFile {
    #[serde(default)]
    pub file_url: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub album: String,
    pub track: String,
    pub title: String,
    pub state: String,
}

#[derive(Tabled)]
pub struct StateCountRow {
    pub state: String,
    pub count: usize,
}
