//! # Catalog Integration Module
//!
//! This module talks to the HIGHRESAUDIO streaming backend. It covers the two
//! operations the downloader needs before any bytes are transferred:
//!
//! ```text
//! Pipeline
//!     ↓
//! Catalog Integration Layer
//!     ├── Authentication (credentials → Session)
//!     └── Albums (reference → album id → AlbumDescriptor)
//!     ↓
//! HTTP Layer (reqwest, cookie store, JSON)
//! ```
//!
//! ## Session
//!
//! Login yields a [`Session`]: the shared HTTP client (with its cookie store)
//! plus the serialized login response the backend expects back as `userData`
//! on every metadata call. The session is passed explicitly to each
//! network-issuing operation; there is no global client.
//!
//! ## Error Types
//!
//! All functions return [`CatalogError`], which distinguishes transport
//! failures, unexpected HTTP statuses and responses the backend marks as
//! unsuccessful.

pub mod album;
pub mod auth;

use std::fmt;

use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, REFERER, USER_AGENT},
};

pub const API_BASE_URL: &str = "https://streaming.highresaudio.com:8182/vault3";
pub const REFERER_URL: &str = "https://stream-app.highresaudio.com/dashboard";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/60.0.3112.113 Safari/537.36";

#[derive(Debug)]
pub enum CatalogError {
    HttpError(reqwest::Error),
    BadStatus(StatusCode),
    BadResponse(String),
    SubscriptionRequired,
    NoAlbumId,
    SerdeError(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::HttpError(e) => write!(f, "{}", e),
            CatalogError::BadStatus(status) => write!(f, "{}", status),
            CatalogError::BadResponse(status) => write!(f, "Bad response: {}", status),
            CatalogError::SubscriptionRequired => write!(f, "Subscription required."),
            CatalogError::NoAlbumId => write!(f, "No album id found in page."),
            CatalogError::SerdeError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::HttpError(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerdeError(err)
    }
}

/// Builds the process-wide HTTP client. Every request looks like it comes
/// from the web player, and cookies set by the backend are kept.
pub fn http_client() -> Result<Client, CatalogError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));

    let client = Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Authenticated session context.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    user_data: String,
    api_base: String,
}

impl Session {
    pub fn new(client: Client, user_data: String) -> Self {
        Self {
            client,
            user_data,
            api_base: API_BASE_URL.to_string(),
        }
    }

    /// Points metadata calls at another backend.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn user_data(&self) -> &str {
        &self.user_data
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}
