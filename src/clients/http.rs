use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::{AIError, ProviderError};

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default HTTP client");
        Client::new()
    })
}

/// Classify a non-2xx reply.
pub(crate) fn status_error(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication,
        _ => ProviderError::Api(format!("{status}: {body}")),
    }
}

/// Send a prepared request and decode a JSON body, mapping transport and
/// status failures into the provider's error variant.
pub(crate) async fn send_json<R: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
    wrap: fn(ProviderError) -> AIError,
) -> Result<R, AIError> {
    let response = request.send().await.map_err(|e| {
        error!(provider, error = %e, "HTTP request failed");
        wrap(ProviderError::Http(e.to_string()))
    })?;

    let status = response.status();
    debug!(provider, status = %status, "Received response");

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let err = status_error(status, &body);
        error!(provider, status = %status, error = %err, "Request rejected");
        return Err(wrap(err));
    }

    response.json::<R>().await.map_err(|e| {
        error!(provider, error = %e, "Failed to decode response envelope");
        wrap(ProviderError::Http(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn client_builder_accepts_timeout() {
        let _client = http_client(Duration::from_millis(1));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, ""), ProviderError::RateLimit));
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), ProviderError::Authentication));
        assert!(matches!(status_error(StatusCode::FORBIDDEN, "nope"), ProviderError::Authentication));
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "overloaded") {
            ProviderError::Api(message) => {
                assert!(message.starts_with("500"));
                assert!(message.ends_with(": overloaded"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    /// Serve one canned HTTP response and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/")
    }

    async fn get(url: &str) -> Result<Value, AIError> {
        let client = Client::builder().no_proxy().timeout(Duration::from_secs(5)).build().unwrap();
        send_json(client.get(url), "test", AIError::Gemini).await
    }

    #[tokio::test]
    async fn decodes_success_body() {
        let url = serve_once("200 OK", r#"{"ok":true}"#).await;
        assert_eq!(get(&url).await.unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn rate_limit_reply_maps_to_rate_limit() {
        let url = serve_once("429 Too Many Requests", "{}").await;
        assert!(matches!(get(&url).await, Err(AIError::Gemini(ProviderError::RateLimit))));
    }

    #[tokio::test]
    async fn server_error_keeps_status_and_body() {
        let url = serve_once("503 Service Unavailable", r#"{"error":"busy"}"#).await;
        match get(&url).await {
            Err(AIError::Gemini(ProviderError::Api(message))) => {
                assert!(message.contains("503"));
                assert!(message.contains("busy"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_an_http_error() {
        let url = serve_once("200 OK", "not json").await;
        assert!(matches!(get(&url).await, Err(AIError::Gemini(ProviderError::Http(_)))));
    }

    #[tokio::test]
    async fn refused_connection_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let result = get(&format!("http://{addr}/")).await;
        assert!(matches!(result, Err(AIError::Gemini(ProviderError::Http(_)))));
    }
}
