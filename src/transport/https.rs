//! HTTPS transport with client-certificate authentication.

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::Transport;
use super::exchange::{Exchange, RawReply};
use crate::error::GatewayError;

/// API version every request declares.
pub const API_VERSION: &str = "2012-03-01";
/// Header carrying [`API_VERSION`].
pub const API_VERSION_HEADER: &str = "x-ms-version";
/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-ms-client-request-id";
/// Content type of request bodies.
pub const REQUEST_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Accepted reply media type.
pub const REPLY_ACCEPT: &str = "application/xml";

/// [`Transport`] over `reqwest` and rustls.
///
/// A client is built per exchange with idle pooling disabled, so no
/// connection outlives the call that opened it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpsTransport;

impl HttpsTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for HttpsTransport {
    async fn send(&self, exchange: Exchange) -> Result<RawReply, GatewayError> {
        let timeout_ms = u64::try_from(exchange.timeout.as_millis()).unwrap_or(u64::MAX);
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .identity(exchange.certificate.identity()?)
            .timeout(exchange.timeout)
            .user_agent(exchange.user_agent.as_str())
            .pool_max_idle_per_host(0)
            .build()?;

        let mut request = client
            .request(exchange.verb.to_method(), exchange.url.as_str())
            .header(API_VERSION_HEADER, API_VERSION)
            .header(REQUEST_ID_HEADER, exchange.request_id.to_string())
            .header(CONTENT_TYPE, REQUEST_CONTENT_TYPE)
            .header(ACCEPT, REPLY_ACCEPT);
        if let Some(body) = exchange.body {
            request = request.body(body);
        }

        let timed_out = |err: reqwest::Error| {
            if err.is_timeout() {
                GatewayError::Timeout { timeout_ms }
            } else {
                GatewayError::Transport(err)
            }
        };

        let response = request.send().await.map_err(timed_out)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(timed_out)?;

        tracing::debug!(status, bytes = body.len(), "exchange completed");
        Ok(RawReply {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::credentials::certificate::tests::client;
    use crate::domain::Verb;

    fn exchange(server: &MockServer, verb: Verb, timeout: Duration) -> Exchange {
        Exchange::new(
            format!("{}/sub/services/sqlservers/servers", server.uri()),
            verb,
            client(),
            timeout,
            "sqlmgmt-gateway/test".to_string(),
        )
    }

    #[tokio::test]
    async fn sends_protocol_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sub/services/sqlservers/servers"))
            .and(header(API_VERSION_HEADER, API_VERSION))
            .and(header("accept", REPLY_ACCEPT))
            .and(header("content-type", REQUEST_CONTENT_TYPE))
            .and(header("user-agent", "sqlmgmt-gateway/test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<Servers/>"))
            .expect(1)
            .mount(&server)
            .await;

        let outgoing = exchange(&server, Verb::Get, Duration::from_secs(5));
        let request_id = outgoing.request_id;
        let Ok(reply) = HttpsTransport::new().send(outgoing).await else {
            panic!("exchange should succeed");
        };
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"<Servers/>");

        let Some(requests) = server.received_requests().await else {
            panic!("recording enabled");
        };
        let Some(received) = requests.first() else {
            panic!("one request recorded");
        };
        assert!(received.body.is_empty());
        let sent_id = received
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        assert_eq!(sent_id, Some(request_id.to_string().as_str()));
    }

    #[tokio::test]
    async fn posts_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let outgoing =
            exchange(&server, Verb::Post, Duration::from_secs(5)).with_body(b"<Server/>".to_vec());
        let Ok(reply) = HttpsTransport::new().send(outgoing).await else {
            panic!("exchange should succeed");
        };
        assert_eq!(reply.status, 201);

        let Some(requests) = server.received_requests().await else {
            panic!("recording enabled");
        };
        assert_eq!(requests.first().map(|r| r.body.clone()), Some(b"<Server/>".to_vec()));
    }

    #[tokio::test]
    async fn error_status_is_still_a_reply() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<Error/>"))
            .mount(&server)
            .await;

        let Ok(reply) = HttpsTransport::new()
            .send(exchange(&server, Verb::Delete, Duration::from_secs(5)))
            .await
        else {
            panic!("a 404 is a reply, not a transport failure");
        };
        assert!(reply.is_client_error());
        assert!(!reply.is_success());
    }

    #[tokio::test]
    async fn slow_reply_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let result = HttpsTransport::new()
            .send(exchange(&server, Verb::Get, Duration::from_millis(100)))
            .await;
        match result {
            Err(GatewayError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 100),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let outgoing = Exchange::new(
            "http://127.0.0.1:9/unreachable".to_string(),
            Verb::Get,
            client(),
            Duration::from_secs(5),
            "t".to_string(),
        );
        let result = HttpsTransport::new().send(outgoing).await;
        assert!(matches!(result, Err(GatewayError::Transport(_))));
    }
}
