use std::sync::LazyLock;

use regex::Regex;

static STORE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://[a-z\d.-]+/[a-z]{2}/album/view/[a-z\d]+/[a-z\d-]+$")
        .expect("valid store url regex")
});

static PLAYER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://[a-z\d.-]+/album/([a-z\d]{8}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{12})$",
    )
    .expect("valid player url regex")
});

/// An accepted album reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumRef {
    /// Store page, e.g. `https://www.highresaudio.com/en/album/view/abc123/some-album`.
    /// The album id has to be scraped from the page.
    Store { url: String },
    /// Web player page, e.g. `https://stream-app.highresaudio.com/album/<uuid>`.
    Player { album_id: String },
}

impl AlbumRef {
    pub fn parse(url: &str) -> Option<Self> {
        if STORE_URL.is_match(url) {
            return Some(AlbumRef::Store {
                url: url.to_string(),
            });
        }
        PLAYER_URL
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| AlbumRef::Player {
                album_id: m.as_str().to_string(),
            })
    }
}

pub fn check_url(url: &str) -> bool {
    AlbumRef::parse(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_url() {
        let url = "https://www.highresaudio.com/en/album/view/y8cfmp/miles-davis-kind-of-blue";
        assert_eq!(
            AlbumRef::parse(url),
            Some(AlbumRef::Store {
                url: url.to_string()
            })
        );
    }

    #[test]
    fn test_player_url_captures_id() {
        assert_eq!(
            AlbumRef::parse(
                "https://stream-app.highresaudio.com/album/0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d"
            ),
            Some(AlbumRef::Player {
                album_id: "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d".to_string()
            })
        );
    }

    #[test]
    fn test_rejected_shapes() {
        assert!(!check_url("https://example.com/album/123"));
        assert!(!check_url("http://www.example.com/en/album/view/123abc/some-slug"));
        assert!(!check_url("https://www.example.com/en/album/view/123abc/some-slug/extra"));
        assert!(!check_url("https://www.example.com/en/album/view/123abc/Some-Slug"));
        assert!(!check_url(
            "https://stream.example.com/album/aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee?x=1"
        ));
        assert!(!check_url(""));
    }
}
