// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use headers::{ContentLength, HeaderMapExt as _};
use tokio::time::Instant;
use tracing::Instrument;

static USER_AGENT: &str = concat!("mountpoint/", env!("CARGO_PKG_VERSION"));

/// Options used when building the HTTP client
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// Total timeout of a request. `None` leaves requests unbounded
    pub timeout: Option<Duration>,

    /// Timeout of the connection phase
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Create a new [`reqwest::Client`] with sane parameters
///
/// # Panics
///
/// Panics if the client fails to build, which should never happen
#[must_use]
pub fn client(options: ClientOptions) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(options.connect_timeout);

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().expect("failed to create HTTP client")
}

async fn send_traced(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let start = Instant::now();
    let (client, request) = request.build_split();
    let request = request?;

    let server_address = request.url().host_str().map(ToOwned::to_owned);
    let method = request.method().to_string();

    let span = tracing::info_span!(
        "http.client.request",
        "otel.kind" = "client",
        "otel.status_code" = tracing::field::Empty,
        "http.request.method" = method,
        "url.full" = %request.url(),
        "server.address" = server_address,
        "http.response.status_code" = tracing::field::Empty,
        "http.response.body.size" = tracing::field::Empty,
        "rust.error" = tracing::field::Empty,
    );

    async move {
        let span = tracing::Span::current();
        let result = client.execute(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                span.record("otel.status_code", "OK");
                span.record("http.response.status_code", response.status().as_u16());

                if let Some(ContentLength(content_length)) = response.headers().typed_get() {
                    span.record("http.response.body.size", content_length);
                }

                tracing::debug!(?duration, status = %response.status(), "Request finished");
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("rust.error", err as &dyn std::error::Error);
                tracing::debug!(?duration, "Request failed");
            }
        }

        result
    }
    .instrument(span)
    .await
}

/// An extension trait implemented for [`reqwest::RequestBuilder`] to send a
/// request within a tracing span.
pub trait RequestBuilderExt {
    /// Send the request within a tracing span.
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
        send_traced(self)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    #[tokio::test]
    async fn test_send_traced() {
        let mock_server = MockServer::start().await;
        let _mock_guard = Mock::given(method("GET"))
            .and(path("/hello"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("world"))
            .expect(1)
            .mount_as_scoped(&mock_server)
            .await;

        let client = client(ClientOptions {
            timeout: Some(Duration::from_secs(5)),
            ..ClientOptions::default()
        });
        let response = client
            .get(format!("{}/hello", mock_server.uri()))
            .send_traced()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "world");
    }
}
