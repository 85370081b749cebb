//! # Acquisition Pipeline
//!
//! Drives one run over the de-duplicated list of album references:
//!
//! ```text
//! reference ─ validate ─ resolve id ─ fetch metadata ─ availability gate
//!     ─ album folder ─ cover ─ booklet ─ tracks (transfer → tag) ─ cover cleanup
//! ```
//!
//! Albums are handled strictly one after another, and so are the tracks of
//! an album. Failures are scoped to the smallest unit they concern: a bad
//! album is reported and skipped, a bad track is reported and the next
//! track is attempted. Cover, booklet and cover cleanup are best effort.
//! Authentication and the output root are handled by the caller, which is
//! where run-fatal errors live.

mod naming;
mod reference;
mod state;
mod tags;

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

pub use naming::{
    ALBUM_FOLDER_MAX_CHARS, BOOKLET_FILE, COVER_FILE, RenderError, TRACK_EXTENSION, album_folder,
    render, render_or_default, track_file_name,
};
pub use reference::{AlbumRef, check_url};
pub use state::{AlbumFailure, InvalidTransition, RunLedger, TrackOutcome, TrackState};
pub use tags::{TRACK_PAD_KEY, TagMapping};

use crate::{
    catalog::{CatalogError, Session, album},
    config::Config,
    flac, info, success,
    transfer,
    types::{AlbumDescriptor, TrackDescriptor},
    utils, warning,
};

/// Reasons an album is skipped.
#[derive(Debug)]
pub enum AlbumError {
    InvalidUrl(String),
    Resolve(CatalogError),
    Metadata(CatalogError),
    Unavailable(DateTime<Utc>),
    CreateDir(PathBuf, io::Error),
}

impl fmt::Display for AlbumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            AlbumError::Resolve(e) => write!(f, "Failed to extract album ID.\n{}", e),
            AlbumError::Metadata(e) => write!(f, "Failed to get metadata.\n{}", e),
            AlbumError::Unavailable(at) => {
                write!(f, "Album unavailable. Available at: {}", at.to_rfc3339())
            }
            AlbumError::CreateDir(path, e) => {
                write!(f, "Failed to make album folder {}.\n{}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for AlbumError {}

/// Processes every reference in order and records what happened.
pub async fn run(session: &Session, config: &Config, urls: &[String]) -> RunLedger {
    let mut ledger = RunLedger::new();
    let album_total = urls.len();

    for (idx, url) in urls.iter().enumerate() {
        info!("Album {} of {}:", idx + 1, album_total);
        if let Err(e) = process_album(session, config, url, &mut ledger).await {
            warning!("{}", e);
            ledger.add_album_failure(url.clone(), e.to_string());
        }
    }

    ledger
}

pub async fn process_album(
    session: &Session,
    config: &Config,
    url: &str,
    ledger: &mut RunLedger,
) -> Result<(), AlbumError> {
    let reference = AlbumRef::parse(url).ok_or_else(|| AlbumError::InvalidUrl(url.to_string()))?;
    let album_id = album::resolve_album_id(session, &reference)
        .await
        .map_err(AlbumError::Resolve)?;
    let meta = album::get_album_meta(session, &album_id, config.language)
        .await
        .map_err(AlbumError::Metadata)?;
    check_availability(&meta, Utc::now())?;

    download_album(session, config, &meta, ledger).await
}

/// Releases become available at their timestamp, not a second earlier.
pub fn check_availability(album: &AlbumDescriptor, now: DateTime<Utc>) -> Result<(), AlbumError> {
    match album.available_from {
        Some(at) if !utils::is_available(Some(at), now) => Err(AlbumError::Unavailable(at)),
        _ => Ok(()),
    }
}

/// Everything from the album folder on. Only a folder creation failure
/// aborts the album; once the folder exists every track is attempted.
pub async fn download_album(
    session: &Session,
    config: &Config,
    meta: &AlbumDescriptor,
    ledger: &mut RunLedger,
) -> Result<(), AlbumError> {
    let (folder, truncated) = album_folder(meta);
    info!("{} - {}", meta.artist, meta.title);
    if truncated {
        warning!(
            "Album folder was chopped as it exceeds {} characters.",
            ALBUM_FOLDER_MAX_CHARS
        );
    }

    let album_path = config.out_path.join(&folder);
    async_fs::create_dir_all(&album_path)
        .await
        .map_err(|e| AlbumError::CreateDir(album_path.clone(), e))?;

    let cover_path = download_cover(session, config, meta, &album_path).await;

    if config.download_booklets {
        if let Some(booklet) = meta.booklet_url() {
            info!("Downloading booklet...");
            let booklet_path = album_path.join(BOOKLET_FILE);
            if let Err(e) =
                transfer::fetch_file(session, &utils::absolute_url(booklet), &booklet_path).await
            {
                warning!("Failed to download booklet.\n{}", e);
            }
        }
    }

    let artwork = match &cover_path {
        Some(path) => read_artwork(path).await,
        None => None,
    };

    let album_tags = TagMapping::for_album(meta);
    let track_total = meta.tracks.len();
    for (idx, track) in meta.tracks.iter().enumerate() {
        let track_num = idx + 1;
        let tags = TagMapping::for_track(&album_tags, track, track_num, track_total);
        let state = process_track(
            session,
            config,
            &album_path,
            track,
            &tags,
            artwork.as_deref(),
        )
        .await;

        ledger.add(TrackOutcome {
            album: folder.clone(),
            track_num,
            track_total,
            title: track.title.clone(),
            state,
        });
    }

    if let Some(cover) = cover_path {
        if !config.keep_cover {
            if let Err(e) = async_fs::remove_file(&cover).await {
                warning!("Failed to delete cover.\n{}", e);
            }
        }
    }

    Ok(())
}

async fn download_cover(
    session: &Session,
    config: &Config,
    meta: &AlbumDescriptor,
    album_path: &Path,
) -> Option<PathBuf> {
    let url = meta
        .cover
        .as_ref()
        .map(|c| c.select(config.max_cover_size))
        .filter(|u| !u.is_empty());

    let Some(url) = url else {
        warning!("Album has no cover.");
        return None;
    };

    let cover_path = album_path.join(COVER_FILE);
    match transfer::fetch_file(session, &utils::absolute_url(url), &cover_path).await {
        Ok(_) => Some(cover_path),
        Err(e) => {
            warning!("Failed to get cover.\n{}", e);
            None
        }
    }
}

/// Cover bytes for embedding, or `None` when the file can't be read or
/// isn't a JPEG. Tracks are then tagged without artwork.
async fn read_artwork(path: &Path) -> Option<Vec<u8>> {
    let bytes = match async_fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warning!("Failed to read cover.\n{}", e);
            return None;
        }
    };
    match flac::jpeg_dimensions(&bytes) {
        Ok(_) => Some(bytes),
        Err(e) => {
            warning!("Cover can't be embedded.\n{}", e);
            None
        }
    }
}

/// Runs one track to a terminal state.
pub async fn process_track(
    session: &Session,
    config: &Config,
    album_path: &Path,
    track: &TrackDescriptor,
    tags: &TagMapping,
    artwork: Option<&[u8]>,
) -> TrackState {
    let state = TrackState::Pending;
    let track_num = tags.get("track").unwrap_or_default();
    let track_total = tags.get("trackTotal").unwrap_or_default();

    let (rendered, render_err) = render_or_default(&config.track_template, tags);
    if let Some(e) = render_err {
        warning!("Failed to parse template. Default will be used instead.\n{}", e);
    }
    let track_path = album_path.join(track_file_name(&rendered));

    match async_fs::metadata(&track_path).await {
        Ok(m) if m.is_file() => {
            info!("Track {} of {} already exists locally.", track_num, track_total);
            return advance(state, TrackState::Skipped);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warning!(
                "Track {} of {}: failed to check if it already exists locally.\n{}",
                track_num, track_total, e
            );
            return advance(state, TrackState::Failed);
        }
    }

    let state = advance(state, TrackState::Downloading);
    info!(
        "Downloading track {} of {}: {} - {} kHz FLAC",
        track_num, track_total, track.title, track.format
    );

    if let Err(e) = transfer::download_track(session, &track.url, &track_path).await {
        warning!(
            "Track {} of {}: {} failed to download.\n{}",
            track_num, track_total, track.title, e
        );
        return advance(state, TrackState::DownloadFailed);
    }

    let tagged = {
        let path = track_path.clone();
        let tags = tags.clone();
        let artwork = artwork.map(<[u8]>::to_vec);
        tokio::task::spawn_blocking(move || flac::write_tags(&path, &tags, artwork.as_deref()))
            .await
    };

    let tag_err = match tagged {
        Ok(Ok(())) => {
            success!("Track {} of {} done.", track_num, track_total);
            return advance(state, TrackState::Tagged);
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };
    warning!(
        "Track {} of {}: {} failed to write tags.\n{}",
        track_num, track_total, track.title, tag_err
    );
    advance(state, TrackState::Failed)
}

fn advance(state: TrackState, next: TrackState) -> TrackState {
    match state.transition(next) {
        Ok(next) => next,
        Err(e) => {
            warning!("{}", e);
            TrackState::Failed
        }
    }
}
