//! The gateway: one typed operation in, one typed reply (or error) out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::codec::{self, Reply};
use crate::config::GatewayConfig;
use crate::credentials::{CredentialProvider, PemDirectoryStore};
use crate::domain::{Thumbprint, Verb};
use crate::error::{self, GatewayError, Lookup};
use crate::operations::Operation;
use crate::routing::{self, EndpointCatalog};
use crate::transport::{Exchange, HttpsTransport, RawReply, Transport};

/// Dispatches typed operations over a [`Transport`].
///
/// Stateless coordinator: holds only immutable configuration. Every call
/// follows the same pattern: resolve route → select endpoint → resolve
/// certificate → encode body → one exchange → decode or translate. Every
/// failure before the exchange happens without network I/O.
///
/// `Gateway` is `Send + Sync`; share it across tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Gateway<T = HttpsTransport> {
    thumbprint: Thumbprint,
    credentials: CredentialProvider,
    endpoints: Arc<EndpointCatalog>,
    transport: T,
    timeout: Duration,
    user_agent: String,
}

impl Gateway<HttpsTransport> {
    /// Creates a gateway over HTTPS, reading certificates from the
    /// configured PEM directory and using the production endpoints.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        let store = Arc::new(PemDirectoryStore::new(config.cert_store_dir.clone()));
        Self::with_parts(
            config.thumbprint.clone(),
            CredentialProvider::new(store),
            EndpointCatalog::default().with_management(config.management_url.clone()),
            HttpsTransport::new(),
        )
        .with_timeout(config.timeout)
        .with_user_agent(config.user_agent.clone())
    }
}

impl<T: Transport> Gateway<T> {
    /// Assembles a gateway from its parts, with the default timeout and
    /// user agent.
    #[must_use]
    pub fn with_parts(
        thumbprint: Thumbprint,
        credentials: CredentialProvider,
        endpoints: EndpointCatalog,
        transport: T,
    ) -> Self {
        Self {
            thumbprint,
            credentials,
            endpoints: Arc::new(endpoints),
            transport,
            timeout: crate::config::DEFAULT_TIMEOUT,
            user_agent: crate::config::default_user_agent(),
        }
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Thumbprint resolved on every call.
    #[must_use]
    pub const fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// Endpoint catalogue.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointCatalog {
        &self.endpoints
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `op` with its declared verb.
    ///
    /// # Errors
    ///
    /// Configuration errors before any I/O, transport errors during the
    /// exchange, [`GatewayError::Domain`] for a 4xx reply and
    /// [`GatewayError::MalformedPayload`] for a 2xx reply that does not
    /// decode.
    pub async fn send<O: Operation>(&self, op: &O) -> Result<O::Response, GatewayError> {
        self.call(op, O::VERB).await
    }

    /// Executes `op` as `GET`; no body is sent.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn get<O: Operation>(&self, op: &O) -> Result<O::Response, GatewayError> {
        self.call(op, Verb::Get).await
    }

    /// Executes `op` as `POST` with its encoded body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn post<O: Operation>(&self, op: &O) -> Result<O::Response, GatewayError> {
        self.call(op, Verb::Post).await
    }

    /// Executes `op` as `PUT` with its encoded body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn put<O: Operation>(&self, op: &O) -> Result<O::Response, GatewayError> {
        self.call(op, Verb::Put).await
    }

    /// Executes `op` as `DELETE`; no body is sent.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn delete<O: Operation>(&self, op: &O) -> Result<O::Response, GatewayError> {
        self.call(op, Verb::Delete).await
    }

    /// Executes `op`, turning a `404` reply into [`Lookup::NotFound`].
    ///
    /// # Errors
    ///
    /// Every failure other than `404` (see [`Gateway::send`]).
    pub async fn lookup<O: Operation>(&self, op: &O) -> Result<Lookup<O::Response>, GatewayError> {
        match self.send(op).await {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(GatewayError::Domain(err)) if err.is_not_found() => Ok(Lookup::NotFound(err)),
            Err(err) => Err(err),
        }
    }

    /// Fetches a resource, creating it when the fetch answers `404`.
    ///
    /// # Errors
    ///
    /// Any non-404 failure of `get`, or any failure of `create`.
    pub async fn fetch_or_create<G, C>(
        &self,
        get: &G,
        create: &C,
    ) -> Result<G::Response, GatewayError>
    where
        G: Operation,
        C: Operation<Response = G::Response>,
    {
        match self.lookup(get).await? {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound(err) => {
                tracing::info!(
                    operation = G::NAME,
                    create = C::NAME,
                    code = err.code.as_deref().unwrap_or(""),
                    "resource not found, creating"
                );
                self.send(create).await
            }
        }
    }

    /// Builds the exchange for `op` without sending it.
    ///
    /// Resolves the route, selects the endpoint, looks up the certificate
    /// and encodes the body when `verb` carries one. No network I/O; the
    /// certificate store is read on the blocking pool.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MissingParameter`], [`GatewayError::InvalidRoute`],
    /// [`GatewayError::UnconfiguredRegion`],
    /// [`GatewayError::CertificateNotFound`] or
    /// [`GatewayError::Encoding`].
    pub async fn prepare<O: Operation>(
        &self,
        op: &O,
        verb: Verb,
    ) -> Result<Exchange, GatewayError> {
        let path = routing::resolve(O::ROUTE, &op.path_params(), &op.query())?;
        let base = self.endpoints.select_base(op.region())?;
        let url = routing::join(base, &path);
        let certificate = self.credentials.resolve_async(&self.thumbprint).await?;

        let exchange = Exchange::new(
            url,
            verb,
            certificate,
            self.timeout,
            self.user_agent.clone(),
        );
        if !verb.carries_body() {
            return Ok(exchange);
        }
        let body = match op.body() {
            Some(body) => codec::encode(&body.record, body.schema)?,
            None => Vec::new(),
        };
        Ok(exchange.with_body(body))
    }

    async fn call<O: Operation>(&self, op: &O, verb: Verb) -> Result<O::Response, GatewayError> {
        let span = tracing::info_span!(
            "gateway_call",
            operation = O::NAME,
            verb = %verb,
            request_id = tracing::field::Empty,
        );
        self.dispatch(op, verb).instrument(span).await
    }

    async fn dispatch<O: Operation>(
        &self,
        op: &O,
        verb: Verb,
    ) -> Result<O::Response, GatewayError> {
        let exchange = self.prepare(op, verb).await.inspect_err(|err| {
            tracing::debug!(error = %err, "rejected before dispatch");
        })?;
        tracing::Span::current().record("request_id", tracing::field::display(exchange.request_id));
        tracing::debug!(
            url = %exchange.url,
            body_bytes = exchange.body.as_ref().map_or(0, Vec::len),
            "dispatching"
        );

        let started = Instant::now();
        let reply = self.transport.send(exchange).await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = interpret::<O::Response>(reply);
        match &result {
            Ok(_) => tracing::info!(elapsed_ms, "call completed"),
            Err(err) => tracing::info!(elapsed_ms, status = ?err.status_code(), error = %err, "call failed"),
        }
        result
    }
}

/// Maps a reply onto the caller's result: 2xx decodes, 4xx becomes a
/// domain error, anything else is an unexpected status.
fn interpret<R: Reply>(reply: RawReply) -> Result<R, GatewayError> {
    if reply.is_success() {
        return R::from_body(&reply.body);
    }
    if reply.is_client_error() {
        return Err(GatewayError::Domain(error::translate(
            reply.status,
            &reply.body,
        )));
    }
    Err(GatewayError::UnexpectedStatus {
        status: reply.status,
        body: reply.text(),
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::VecDeque;

    use tokio::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::codec::NoContent;
    use crate::credentials::certificate::tests::{CLIENT_THUMBPRINT, client};
    use crate::credentials::{CertificateStore, MemoryStore, StoreSession};
    use crate::domain::DataCenter;
    use crate::error::ErrorClass;
    use crate::operations::dac::tests::export;
    use crate::operations::databases::tests::DATABASE_XML;
    use crate::operations::firewall::tests::{RULE_XML, spec};
    use crate::operations::{
        CreateFirewallRule, CreateServer, DeleteDatabase, GetDatabase, GetFirewallRule,
        NewServer,
    };
    use crate::routing::PathParams;
    use crate::transport::API_VERSION;

    const NOT_FOUND_XML: &str = r#"<Error xmlns="http://schemas.microsoft.com/windowsazure">
  <Type>X</Type><Message>not found</Message><Code>404</Code><Param>ServerName</Param>
</Error>"#;

    /// Scripted transport that records every exchange.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        replies: Mutex<VecDeque<RawReply>>,
        sent: Mutex<Vec<Exchange>>,
    }

    impl RecordingTransport {
        fn replying(replies: &[(u16, &str)]) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .iter()
                        .map(|(status, body)| RawReply {
                            status: *status,
                            body: body.as_bytes().to_vec(),
                        })
                        .collect(),
                ),
                sent: Mutex::new(Vec::new()),
            }
        }

        async fn sent(&self) -> Vec<Exchange> {
            self.sent.lock().await.clone()
        }
    }

    impl Transport for RecordingTransport {
        async fn send(&self, exchange: Exchange) -> Result<RawReply, GatewayError> {
            self.sent.lock().await.push(exchange);
            self.replies
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| GatewayError::Configuration("no scripted reply".to_string()))
        }
    }

    fn thumbprint(raw: &str) -> Thumbprint {
        match Thumbprint::parse(raw) {
            Ok(tp) => tp,
            Err(err) => panic!("bad thumbprint: {err}"),
        }
    }

    fn gateway_with(
        transport: RecordingTransport,
        raw_thumbprint: &str,
        endpoints: EndpointCatalog,
    ) -> (Gateway<RecordingTransport>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(vec![client()]));
        let gateway = Gateway::with_parts(
            thumbprint(raw_thumbprint),
            CredentialProvider::new(Arc::clone(&store) as Arc<dyn CertificateStore>),
            endpoints,
            transport,
        )
        .with_timeout(Duration::from_secs(7))
        .with_user_agent("gateway-tests");
        (gateway, store)
    }

    fn gateway(replies: &[(u16, &str)]) -> Gateway<RecordingTransport> {
        gateway_with(
            RecordingTransport::replying(replies),
            CLIENT_THUMBPRINT,
            EndpointCatalog::default(),
        )
        .0
    }

    fn get_rule() -> GetFirewallRule {
        GetFirewallRule {
            subscription_id: "sub".to_string(),
            server_name: "srv".to_string(),
            rule_name: "office".to_string(),
        }
    }

    fn create_rule() -> CreateFirewallRule {
        CreateFirewallRule {
            subscription_id: "sub".to_string(),
            server_name: "srv".to_string(),
            rule: spec(),
        }
    }

    fn create_server() -> CreateServer {
        CreateServer {
            subscription_id: "sub".to_string(),
            server: NewServer {
                administrator_login: "admin".to_string(),
                administrator_password: "pw".to_string(),
                location: DataCenter::EastUs,
            },
        }
    }

    #[tokio::test]
    async fn get_never_carries_a_body() {
        let gateway = gateway(&[(200, RULE_XML)]);
        let Ok(rule) = gateway.get(&create_rule()).await else {
            panic!("call should succeed");
        };
        assert_eq!(rule.header.name, "office");

        let sent = gateway.transport().sent().await;
        let Some(exchange) = sent.first() else {
            panic!("one exchange");
        };
        assert_eq!(exchange.verb, Verb::Get);
        assert!(exchange.body.is_none());
    }

    #[tokio::test]
    async fn post_sends_encoded_body_to_management_endpoint() {
        let gateway = gateway(&[(201, RULE_XML)]);
        assert!(gateway.send(&create_rule()).await.is_ok());

        let sent = gateway.transport().sent().await;
        let Some(exchange) = sent.first() else {
            panic!("one exchange");
        };
        assert_eq!(exchange.verb, Verb::Post);
        assert_eq!(
            exchange.url,
            "https://management.core.windows.net:8443/sub/services/sqlservers/servers/srv/firewallrules"
        );
        assert_eq!(exchange.timeout, Duration::from_secs(7));
        assert_eq!(exchange.user_agent, "gateway-tests");
        let body = String::from_utf8_lossy(exchange.body.as_deref().unwrap_or_default());
        assert!(body.contains("<Name>office</Name>"));
    }

    #[tokio::test]
    async fn post_without_body_schema_sends_empty_body() {
        let gateway = gateway(&[(200, DATABASE_XML)]);
        let op = GetDatabase {
            subscription_id: "sub".to_string(),
            server_name: "srv".to_string(),
            database_name: "orders".to_string(),
        };
        assert!(gateway.post(&op).await.is_ok());
        let sent = gateway.transport().sent().await;
        assert_eq!(sent.first().and_then(|e| e.body.clone()), Some(Vec::new()));
    }

    #[tokio::test]
    async fn unknown_thumbprint_fails_before_any_request() {
        let (gateway, store) = gateway_with(
            RecordingTransport::replying(&[(201, "<ServerName>x</ServerName>")]),
            "ABC123",
            EndpointCatalog::default(),
        );

        let result = gateway.send(&create_server()).await;
        let Err(GatewayError::CertificateNotFound { thumbprint: tp }) = &result else {
            panic!("expected CertificateNotFound, got {result:?}");
        };
        assert_eq!(tp.as_str(), "ABC123");
        assert!(gateway.transport().sent().await.is_empty());
        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.sessions_active(), 0);
    }

    #[tokio::test]
    async fn unconfigured_region_fails_before_credentials() {
        let (gateway, store) = gateway_with(
            RecordingTransport::default(),
            CLIENT_THUMBPRINT,
            EndpointCatalog::default().without_region(DataCenter::WestEurope),
        );
        let result = gateway.send(&export()).await;
        assert!(matches!(
            result,
            Err(GatewayError::UnconfiguredRegion(DataCenter::WestEurope))
        ));
        assert_eq!(store.sessions_opened(), 0);
        assert!(gateway.transport().sent().await.is_empty());
    }

    #[derive(Debug)]
    struct UnboundRoute;

    impl Operation for UnboundRoute {
        type Response = NoContent;
        const NAME: &'static str = "UnboundRoute";
        const VERB: Verb = Verb::Get;
        const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}";

        fn path_params(&self) -> PathParams {
            PathParams::new().with("SubscriptionId", "sub")
        }
    }

    #[tokio::test]
    async fn missing_path_parameter_fails_before_any_request() {
        let gateway = gateway(&[]);
        let result = gateway.send(&UnboundRoute).await;
        let Err(err) = result else {
            panic!("expected MissingParameter");
        };
        assert!(matches!(&err, GatewayError::MissingParameter { name } if name == "ServerName"));
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert!(gateway.transport().sent().await.is_empty());
    }

    #[tokio::test]
    async fn regional_operation_targets_region_endpoint() {
        let guid = "<guid>6f1b7c9e-2d4a-4e8b-9a3c-5d7e9f1a2b3c</guid>";
        let gateway = gateway(&[(200, guid)]);
        let Ok(reply) = gateway.send(&export()).await else {
            panic!("export should succeed");
        };
        assert_eq!(reply.guid.to_string(), "6f1b7c9e-2d4a-4e8b-9a3c-5d7e9f1a2b3c");
        let sent = gateway.transport().sent().await;
        assert_eq!(
            sent.first().map(|e| e.url.as_str()),
            Some("https://am1prod-dacsvc.azure.com/DACWebService.svc/Export")
        );
    }

    #[tokio::test]
    async fn not_found_is_a_domain_error() {
        let gateway = gateway(&[(404, NOT_FOUND_XML)]);
        let result = gateway.send(&get_rule()).await;
        let Err(GatewayError::Domain(err)) = &result else {
            panic!("expected Domain, got {result:?}");
        };
        assert_eq!(err.status, 404);
        assert_eq!(err.kind.as_deref(), Some("X"));
        assert_eq!(err.message, "not found");
        assert_eq!(err.code.as_deref(), Some("404"));
        assert_eq!(err.param.as_deref(), Some("ServerName"));
    }

    #[tokio::test]
    async fn lookup_separates_not_found_from_failures() {
        let gateway = gateway(&[(404, NOT_FOUND_XML), (409, "<Error><Message>busy</Message></Error>")]);
        let Ok(first) = gateway.lookup(&get_rule()).await else {
            panic!("404 is not an Err");
        };
        assert!(first.is_not_found());

        let second = gateway.lookup(&get_rule()).await;
        assert!(matches!(second, Err(GatewayError::Domain(ref e)) if e.status == 409));
    }

    #[tokio::test]
    async fn fetch_or_create_creates_only_after_not_found() {
        let gateway = gateway(&[(404, NOT_FOUND_XML), (201, RULE_XML)]);
        let Ok(rule) = gateway.fetch_or_create(&get_rule(), &create_rule()).await else {
            panic!("create should succeed");
        };
        assert_eq!(rule.end_ip_address, "10.0.0.254");
        let verbs: Vec<Verb> = gateway.transport().sent().await.iter().map(|e| e.verb).collect();
        assert_eq!(verbs, vec![Verb::Get, Verb::Post]);
    }

    #[tokio::test]
    async fn fetch_or_create_skips_create_when_found() {
        let gateway = gateway(&[(200, RULE_XML)]);
        assert!(gateway.fetch_or_create(&get_rule(), &create_rule()).await.is_ok());
        assert_eq!(gateway.transport().sent().await.len(), 1);
    }

    #[tokio::test]
    async fn fetch_or_create_propagates_other_errors() {
        let gateway = gateway(&[(400, "<Error><Message>bad</Message></Error>")]);
        let result = gateway.fetch_or_create(&get_rule(), &create_rule()).await;
        assert!(matches!(result, Err(GatewayError::Domain(ref e)) if e.status == 400));
        assert_eq!(gateway.transport().sent().await.len(), 1);
    }

    #[tokio::test]
    async fn server_error_is_transport_class() {
        let gateway = gateway(&[(503, "Service Unavailable")]);
        let result = gateway.send(&get_rule()).await;
        let Err(err) = result else {
            panic!("503 must fail");
        };
        assert!(matches!(&err, GatewayError::UnexpectedStatus { status: 503, body } if body == "Service Unavailable"));
        assert_eq!(err.class(), ErrorClass::Transport);
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn malformed_success_body_is_reported() {
        let gateway = gateway(&[(200, "<Unexpected/>")]);
        let result = gateway.send(&get_rule()).await;
        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn no_content_ignores_body() {
        let gateway = gateway(&[(200, "")]);
        let op = DeleteDatabase {
            subscription_id: "sub".to_string(),
            server_name: "srv".to_string(),
            database_name: "orders".to_string(),
        };
        assert_eq!(gateway.send(&op).await.ok(), Some(NoContent));
        let sent = gateway.transport().sent().await;
        assert_eq!(sent.first().map(|e| e.verb), Some(Verb::Delete));
        assert!(sent.first().is_some_and(|e| e.body.is_none()));
    }

    #[tokio::test]
    async fn request_ids_are_fresh_per_call() {
        let gateway = gateway(&[(200, RULE_XML), (200, RULE_XML)]);
        assert!(gateway.send(&get_rule()).await.is_ok());
        assert!(gateway.send(&get_rule()).await.is_ok());
        let sent = gateway.transport().sent().await;
        let ids: Vec<_> = sent.iter().map(|e| e.request_id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids.first(), ids.get(1));
    }

    /// Wraps a store and records the thread each session is opened on.
    #[derive(Debug)]
    struct ThreadTrackingStore {
        inner: MemoryStore,
        opened_on: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl CertificateStore for ThreadTrackingStore {
        fn open(&self) -> Result<Box<dyn StoreSession + '_>, GatewayError> {
            if let Ok(mut threads) = self.opened_on.lock() {
                threads.push(std::thread::current().id());
            }
            self.inner.open()
        }
    }

    #[tokio::test]
    async fn certificate_store_is_read_off_the_async_worker() {
        let store = Arc::new(ThreadTrackingStore {
            inner: MemoryStore::new(vec![client()]),
            opened_on: std::sync::Mutex::new(Vec::new()),
        });
        let gateway = Gateway::with_parts(
            thumbprint(CLIENT_THUMBPRINT),
            CredentialProvider::new(Arc::clone(&store) as Arc<dyn CertificateStore>),
            EndpointCatalog::default(),
            RecordingTransport::replying(&[(200, RULE_XML)]),
        );

        assert!(gateway.send(&get_rule()).await.is_ok());

        let Ok(threads) = store.opened_on.lock() else {
            panic!("lock poisoned");
        };
        assert_eq!(threads.len(), 1);
        assert!(threads.iter().all(|id| *id != std::thread::current().id()));
        assert_eq!(store.inner.sessions_active(), 0);
    }

    #[test]
    fn gateway_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Gateway>();
    }

    #[tokio::test]
    async fn https_round_trip_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sub/services/sqlservers/servers/srv/databases/orders"))
            .and(header("x-ms-version", API_VERSION))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(DATABASE_XML, "application/xml"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sub/services/sqlservers/servers/srv/databases/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_raw(NOT_FOUND_XML, "application/xml"),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new(vec![client()]));
        let gateway = Gateway::with_parts(
            thumbprint(CLIENT_THUMBPRINT),
            CredentialProvider::new(store),
            EndpointCatalog::new(server.uri()),
            HttpsTransport::new(),
        );

        let get = |name: &str| GetDatabase {
            subscription_id: "sub".to_string(),
            server_name: "srv".to_string(),
            database_name: name.to_string(),
        };

        let Ok(db) = gateway.send(&get("orders")).await else {
            panic!("database should be fetched");
        };
        assert_eq!(db.header.name, "orders");
        assert_eq!(db.edition, "Standard");

        let Ok(missing) = gateway.lookup(&get("missing")).await else {
            panic!("404 should be a lookup miss");
        };
        let Lookup::NotFound(err) = missing else {
            panic!("expected NotFound");
        };
        assert_eq!(err.param.as_deref(), Some("ServerName"));
    }
}
