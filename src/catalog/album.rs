use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;

use crate::{
    catalog::{CatalogError, Session},
    config::Language,
    pipeline::AlbumRef,
    types::{AlbumDescriptor, AlbumMetaResponse},
};

static DATA_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-id="([a-z\d]{8}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{12})""#)
        .expect("valid data-id regex")
});

/// Pulls the album id out of a store page.
pub fn extract_album_id(html: &str) -> Option<String> {
    DATA_ID
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a validated reference to a catalog id.
///
/// Player references already carry the id. Store pages have to be fetched
/// and scanned for the `data-id` attribute of the player widget.
pub async fn resolve_album_id(
    session: &Session,
    reference: &AlbumRef,
) -> Result<String, CatalogError> {
    match reference {
        AlbumRef::Player { album_id } => Ok(album_id.clone()),
        AlbumRef::Store { url } => {
            let res = session.client().get(url).send().await?;
            if res.status() != StatusCode::OK {
                return Err(CatalogError::BadStatus(res.status()));
            }
            let body = res.text().await?;
            extract_album_id(&body).ok_or(CatalogError::NoAlbumId)
        }
    }
}

/// Fetches album and track metadata in the configured language.
pub async fn get_album_meta(
    session: &Session,
    album_id: &str,
    language: Language,
) -> Result<AlbumDescriptor, CatalogError> {
    let url = format!(
        "{base}/vault/album/",
        base = session.api_base().trim_end_matches('/')
    );
    let res = session
        .client()
        .get(&url)
        .query(&[
            ("album_id", album_id),
            ("userData", session.user_data()),
            ("lang", language.code()),
        ])
        .send()
        .await?;

    if res.status() != StatusCode::OK {
        return Err(CatalogError::BadStatus(res.status()));
    }

    let meta: AlbumMetaResponse = res.json().await?;
    if meta.response_status != "OK" {
        return Err(CatalogError::BadResponse(meta.response_status));
    }
    meta.data
        .map(|d| d.results)
        .ok_or_else(|| CatalogError::BadResponse("missing album data".to_string()))
}
