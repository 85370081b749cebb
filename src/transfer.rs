//! Streaming downloads to local files.
//!
//! Bodies are written to `<dest>.part` and only renamed onto `<dest>` once the
//! whole body arrived. A failed transfer removes the partial file, so an
//! existing `<dest>` always means a completed download.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{RequestBuilder, Response, StatusCode, header::RANGE};
use tokio::{fs::File, io::AsyncWriteExt};

use crate::catalog::Session;

#[derive(Debug)]
pub enum TransferError {
    HttpError(reqwest::Error),
    BadStatus(StatusCode),
    IoError(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::HttpError(e) => write!(f, "{}", e),
            TransferError::BadStatus(status) => write!(f, "{}", status),
            TransferError::IoError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<reqwest::Error> for TransferError {
    fn from(err: reqwest::Error) -> Self {
        TransferError::HttpError(err)
    }
}

impl From<io::Error> for TransferError {
    fn from(err: io::Error) -> Self {
        TransferError::IoError(err)
    }
}

/// Downloads a track with an open-ended range request starting at offset 0.
///
/// `200 OK` and `206 Partial Content` both count as success. Progress is
/// drawn on stderr. Returns the number of bytes written.
pub async fn download_track(
    session: &Session,
    url: &str,
    dest: &Path,
) -> Result<u64, TransferError> {
    let request = session.client().get(url).header(RANGE, "bytes=0-");
    transfer(request, dest, true, true).await
}

/// Downloads a plain file such as a cover or booklet. Only `200 OK` is
/// accepted and no progress is shown.
pub async fn fetch_file(session: &Session, url: &str, dest: &Path) -> Result<u64, TransferError> {
    let request = session.client().get(url);
    transfer(request, dest, false, false).await
}

pub fn part_path(dest: &Path) -> PathBuf {
    let mut path = dest.as_os_str().to_owned();
    path.push(".part");
    PathBuf::from(path)
}

async fn transfer(
    request: RequestBuilder,
    dest: &Path,
    accept_partial: bool,
    show_progress: bool,
) -> Result<u64, TransferError> {
    let mut res = request.send().await?;
    let status = res.status();
    let accepted =
        status == StatusCode::OK || (accept_partial && status == StatusCode::PARTIAL_CONTENT);
    if !accepted {
        return Err(TransferError::BadStatus(status));
    }

    let part = part_path(dest);
    let pb = if show_progress {
        progress_bar(res.content_length())
    } else {
        ProgressBar::hidden()
    };

    let result = match stream_to_file(&mut res, &part, &pb).await {
        Ok(written) => tokio::fs::rename(&part, dest)
            .await
            .map(|_| written)
            .map_err(TransferError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(written) => {
            pb.finish();
            Ok(written)
        }
        Err(e) => {
            pb.abandon();
            let _ = tokio::fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    res: &mut Response,
    path: &Path,
    pb: &ProgressBar,
) -> Result<u64, TransferError> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = res.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }

    file.flush().await?;
    Ok(written)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template("{percent}%, {bytes}/{total_bytes} [{bar:30.blue}]")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_style(
                ProgressStyle::with_template("{spinner:.blue} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
            pb
        }
    }
}
