#![allow(clippy::unwrap_used)]
// End-to-end tests for `NetworkIdProvider` against a wiremock lookup API.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netid_core::{
    ApiCredential, CoreError, CredentialStore, DirectoryPolicy, NetworkDirectorySource,
    NetworkEntry, NetworkIdProvider, ResolverConfig, StaticCredentialStore, StaticDirectorySource,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Credential store that counts loads.
struct CountingStore {
    inner: StaticCredentialStore,
    loads: AtomicUsize,
}

impl CountingStore {
    fn new(password: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticCredentialStore::new(ApiCredential::new("fl1", password)),
            loads: AtomicUsize::new(0),
        })
    }

    fn rotate(&self, password: &str) {
        self.inner.set(ApiCredential::new("fl1", password));
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    async fn load_credential(&self) -> Result<ApiCredential, CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_credential().await
    }
}

/// Directory source that counts loads.
struct CountingSource {
    inner: StaticDirectorySource,
    loads: AtomicUsize,
}

impl CountingSource {
    fn new(networks: Vec<NetworkEntry>) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticDirectorySource::new(networks),
            loads: AtomicUsize::new(0),
        })
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl NetworkDirectorySource for CountingSource {
    async fn load_networks(&self) -> Result<Vec<NetworkEntry>, CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_networks().await
    }
}

type TestProvider = NetworkIdProvider<Arc<CountingStore>, Arc<CountingSource>>;

fn known_networks() -> Vec<NetworkEntry> {
    vec![
        NetworkEntry::new("24001", "Telia", "Sweden"),
        NetworkEntry::new("24008", "Telenor", "Sweden"),
    ]
}

fn ok_body(network_id: &str, vlr: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<response><message>ok</message><MCC_MNC>{network_id}</MCC_MNC>\
         <VLR_address>{vlr}</VLR_address></response>"
    ))
}

async fn setup_with(
    policy: DirectoryPolicy,
) -> (MockServer, TestProvider, Arc<CountingStore>, Arc<CountingSource>) {
    let server = MockServer::start().await;
    let mut config = ResolverConfig::new(format!("{}/lookup?msisdn=", server.uri()));
    config.directory_policy = policy;

    let store = CountingStore::new("current");
    let source = CountingSource::new(known_networks());
    let provider = NetworkIdProvider::connect(&config, Arc::clone(&store), Arc::clone(&source))
        .await
        .unwrap();
    (server, provider, store, source)
}

async fn setup() -> (MockServer, TestProvider, Arc<CountingStore>, Arc<CountingSource>) {
    setup_with(DirectoryPolicy::Permissive).await
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

/// Captures formatted log output for the current thread.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

// ── Start-up ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_loads_credential_and_directory_once() {
    let (_server, provider, store, source) = setup().await;

    assert_eq!(store.loads(), 1);
    assert_eq!(source.loads(), 1);
    assert_eq!(provider.directory().len(), 2);
    assert!(provider.cache().is_empty());
}

#[tokio::test]
async fn test_connect_rejects_invalid_url() {
    let config = ResolverConfig::new("definitely not a url");
    let result = NetworkIdProvider::connect(
        &config,
        CountingStore::new("current"),
        CountingSource::new(known_networks()),
    )
    .await;

    assert!(matches!(result, Err(CoreError::Config { .. })));
}

// ── Caching ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeat_resolution_hits_cache() {
    let (server, provider, _store, _source) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("msisdn", "46700000001"))
        .respond_with(ok_body("24001", "46705000000"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(provider.get_network_id("46700000001").await.unwrap(), "24001");
    assert_eq!(provider.get_network_id("46700000001").await.unwrap(), "24001");

    assert_eq!(request_count(&server).await, 1);
    assert_eq!(
        provider.cache().peek("46700000001").unwrap().network_id,
        "24001"
    );
}

#[tokio::test]
async fn test_distinct_subscribers_get_distinct_entries() {
    let (server, provider, _store, _source) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("msisdn", "46700000001"))
        .respond_with(ok_body("24001", "46705000000"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("msisdn", "46700000002"))
        .respond_with(ok_body("24008", "46705000001"))
        .mount(&server)
        .await;

    assert_eq!(provider.get_network_id("46700000001").await.unwrap(), "24001");
    assert_eq!(provider.get_network_id("46700000002").await.unwrap(), "24008");
    assert_eq!(provider.cache().len(), 2);
}

// ── Credential refresh ──────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_refreshes_once_and_retries() {
    let (server, provider, store, _source) = setup().await;

    Mock::given(method("GET"))
        .and(basic_auth("fl1", "current"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(basic_auth("fl1", "rotated"))
        .respond_with(ok_body("24001", "46705000000"))
        .expect(1)
        .mount(&server)
        .await;

    store.rotate("rotated");
    assert_eq!(provider.get_network_id("46700000001").await.unwrap(), "24001");

    assert_eq!(store.loads(), 2, "exactly one refresh after start-up");
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_second_unauthorized_propagates_without_third_call() {
    let (server, provider, store, _source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    assert!(
        matches!(result, Err(CoreError::Unauthorized { .. })),
        "expected Unauthorized, got {result:?}"
    );
    assert_eq!(store.loads(), 2);
    assert_eq!(request_count(&server).await, 2);
    assert!(provider.cache().is_empty());
}

#[tokio::test]
async fn test_retry_failure_of_other_kind_propagates() {
    let (server, provider, store, _source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    assert!(
        matches!(result, Err(CoreError::Transport { status: Some(500), .. })),
        "expected Transport 500, got {result:?}"
    );
    assert_eq!(store.loads(), 2);
    assert_eq!(request_count(&server).await, 2);
}

// ── Failures that are never retried ─────────────────────────────────

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let (server, provider, store, _source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    assert!(matches!(result, Err(CoreError::Transport { .. })));
    assert_eq!(store.loads(), 1);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_non_ok_status_is_invalid_response() {
    let (server, provider, store, _source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<response><message>subscriber absent</message></response>"),
        )
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    match result {
        Err(CoreError::InvalidResponse { status, body }) => {
            assert_eq!(status, "subscriber absent");
            assert!(body.contains("<message>subscriber absent</message>"));
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
    assert_eq!(store.loads(), 1);
    assert!(provider.cache().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_transport_failure() {
    let (server, provider, _store, _source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    assert!(matches!(result, Err(CoreError::Transport { status: None, .. })));
    assert_eq!(request_count(&server).await, 1);
}

// ── Directory reconciliation ────────────────────────────────────────

#[tokio::test]
async fn test_known_network_does_not_reload_directory() {
    let (server, provider, _store, source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ok_body("24008", "46705000000"))
        .mount(&server)
        .await;

    provider.get_network_id("46700000001").await.unwrap();
    assert_eq!(source.loads(), 1);
}

#[tokio::test]
async fn test_newly_provisioned_network_is_found_after_one_reload() {
    let (server, provider, _store, source) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ok_body("23410", "447700000000"))
        .mount(&server)
        .await;

    let mut provisioned = known_networks();
    provisioned.push(NetworkEntry::new("23410", "O2", "United Kingdom"));
    source.inner.replace(provisioned);

    assert_eq!(provider.get_network_id("447700900123").await.unwrap(), "23410");
    assert_eq!(source.loads(), 2);
    assert_eq!(provider.network("23410").unwrap().name, "O2");
}

#[tokio::test]
async fn test_unauthorized_then_unknown_network_is_still_returned() {
    let (server, provider, store, source) = setup().await;
    let (logs, _guard) = capture_logs();

    Mock::given(method("GET"))
        .and(query_param("msisdn", "X"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("msisdn", "X"))
        .respond_with(ok_body("99999", "46705550000"))
        .mount(&server)
        .await;

    assert_eq!(provider.get_network_id("X").await.unwrap(), "99999");

    assert_eq!(store.loads(), 2);
    assert_eq!(source.loads(), 2);
    assert_eq!(provider.cache().peek("X").unwrap().network_id, "99999");

    let output = logs.contents();
    assert!(output.contains("ERROR"), "no error logged:\n{output}");
    assert!(
        output.contains("46705550000"),
        "VLR address missing from diagnostics:\n{output}"
    );
}

#[tokio::test]
async fn test_strict_policy_rejects_unknown_network() {
    let (server, provider, _store, source) = setup_with(DirectoryPolicy::Strict).await;

    Mock::given(method("GET"))
        .respond_with(ok_body("99999", "46705550000"))
        .mount(&server)
        .await;

    let result = provider.get_network_id("46700000001").await;

    match result {
        Err(CoreError::UnknownNetwork { msisdn, network_id }) => {
            assert_eq!(msisdn, "46700000001");
            assert_eq!(network_id, "99999");
        }
        other => panic!("expected UnknownNetwork, got {other:?}"),
    }
    assert_eq!(source.loads(), 2);
    assert!(provider.cache().is_empty());
}

// ── Concurrency ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolutions_share_one_provider() {
    let (server, provider, _store, _source) = setup().await;
    let provider = Arc::new(provider);

    Mock::given(method("GET"))
        .respond_with(ok_body("24001", "46705000000"))
        .mount(&server)
        .await;

    let tasks = (0..16).map(|i| {
        let provider = Arc::clone(&provider);
        tokio::spawn(async move { provider.get_network_id(&format!("4670000{i:04}")).await })
    });

    for result in futures::future::join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), "24001");
    }
    assert_eq!(provider.cache().len(), 16);
    assert_eq!(request_count(&server).await, 16);
}
