// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use mountpoint_http::RequestBuilderExt as _;
use thiserror::Error;
use url::Url;

use crate::uri::trailing_slash;

/// Path of the manifest endpoint, relative to the remote base URL
pub const REMOTE_MANIFEST_ENDPOINT: &str = "asset-manifest";

/// Error returned when the remote manifest can't be fetched
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    /// The request failed
    #[error("failed to fetch the remote asset manifest")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error
    #[error("remote asset manifest endpoint answered with status {status}")]
    Status {
        /// The HTTP status
        status: reqwest::StatusCode,
    },

    /// The manifest is empty
    #[error("remote asset manifest is empty")]
    Empty,

    /// The manifest is not a JSON list of URLs
    #[error("failed to decode the remote asset manifest")]
    Decode(#[from] serde_json::Error),
}

/// The URL of the manifest endpoint of a remote application
#[must_use]
pub fn manifest_url(base_url: &Url, suffix: &str) -> String {
    format!(
        "{}{REMOTE_MANIFEST_ENDPOINT}{suffix}",
        trailing_slash(base_url.as_str())
    )
}

/// Fetch the list of asset URLs of a remote application.
///
/// The request is made once, without retry.
///
/// # Errors
///
/// Returns an error if the request fails, or if the answer is not a non-empty
/// JSON list of URLs
#[tracing::instrument(name = "spa.remote.fetch", skip_all, fields(%base_url))]
pub async fn fetch_remote(
    client: &reqwest::Client,
    base_url: &Url,
    suffix: &str,
) -> Result<Vec<String>, RemoteFetchError> {
    let url = manifest_url(base_url, suffix);
    let response = client.get(url).send_traced().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RemoteFetchError::Status { status });
    }

    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RemoteFetchError::Empty);
    }

    let assets: Option<Vec<String>> = serde_json::from_slice(&body)?;
    match assets {
        Some(assets) if !assets.is_empty() => Ok(assets),
        _ => Err(RemoteFetchError::Empty),
    }
}
