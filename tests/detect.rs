use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use userstack::{
    Client, ClientBuilder, DecodeMode, DetectOptions, DetectOutcome, DeviceType, EntityType,
    ErrorType, HttpTransport, UserstackError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test_access_key_1234";
const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/76.0.3809.100 Safari/537.36";

fn client_for(server: &MockServer) -> ClientBuilder {
    ClientBuilder::new().access_key(KEY).base_url(server.uri())
}

fn chrome_body() -> serde_json::Value {
    json!({
        "ua": CHROME_UA,
        "type": "browser",
        "brand": "Google",
        "name": "Chrome",
        "url": "https://www.google.com/about/company/",
        "os": {
            "name": "Windows 10",
            "code": "windows_10",
            "url": "https://en.wikipedia.org/wiki/Windows_10",
            "family": "Windows",
            "family_code": "windows",
            "family_vendor": "Microsoft Corporation.",
            "icon": "https://assets.userstack.com/icon/os/windows10.png",
            "icon_large": "https://assets.userstack.com/icon/os/windows10_big.png"
        },
        "device": {
            "is_mobile_device": false,
            "type": "desktop",
            "brand": "Apple",
            "brand_code": "apple",
            "brand_url": "http://www.apple.com/",
            "name": "Mac"
        },
        "browser": {
            "name": "Chrome",
            "version": "76.0.3809.100",
            "version_major": "76",
            "engine": "WebKit/Blink"
        },
        "crawler": {
            "is_crawler": false,
            "category": null,
            "last_seen": null
        }
    })
}

fn failure_body(code: u16, error_type: &str, info: &str) -> serde_json::Value {
    json!({
        "success": false,
        "error": { "code": code, "type": error_type, "info": info }
    })
}

#[tokio::test]
async fn detect_without_success_flag_returns_stack() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .and(query_param("access_key", KEY))
        .and(query_param("ua", CHROME_UA))
        .respond_with(ResponseTemplate::new(200).set_body_json(chrome_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let stack = client.detect(CHROME_UA).await.unwrap();

    assert_eq!(stack.ua, CHROME_UA);
    assert_eq!(stack.entity_type, Some(EntityType::Browser));
    assert_eq!(stack.os.family_vendor, "Microsoft Corporation.");
    assert_eq!(stack.device.device_type, Some(DeviceType::Desktop));
    assert_eq!(stack.browser.engine, "WebKit/Blink");
    assert!(!stack.is_mobile());
}

#[tokio::test]
async fn failure_body_with_http_200_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failure_body(
            101,
            "invalid_access_key",
            "You have not supplied a valid API Access Key.",
        )))
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let err = client.detect(CHROME_UA).await.unwrap_err();

    let api = err.api_error().expect("expected an API error");
    assert_eq!(api.code, 101);
    assert_eq!(api.error_type, Some(ErrorType::InvalidAccessKey));
    assert_eq!(api.to_string(), "101: You have not supplied a valid API Access Key.");
}

#[tokio::test]
async fn http_status_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(500).set_body_json(chrome_body()))
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let stack = client.detect(CHROME_UA).await.unwrap();
    assert_eq!(stack.browser.name, "Chrome");
}

#[tokio::test]
async fn empty_access_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chrome_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = ClientBuilder::new()
        .access_key("")
        .base_url(server.uri())
        .build()
        .unwrap_err();

    let api = err.api_error().expect("expected an API error");
    assert_eq!(api.error_type, Some(ErrorType::MissingAccessKey));
    assert_eq!(api.code, 101);
}

#[tokio::test]
async fn empty_user_agent_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .and(query_param("ua", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(failure_body(
            301,
            "missing_user_agent",
            "No User-Agent string has been specified.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let outcome = client
        .detect_outcome("", &DetectOptions::default())
        .await
        .unwrap();

    let DetectOutcome::Failure(err) = outcome else {
        panic!("expected a failure outcome");
    };
    assert_eq!(err.code, 301);
    assert_eq!(err.error_type, Some(ErrorType::MissingUserAgent));
}

#[tokio::test]
async fn fields_option_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .and(query_param("fields", "browser.name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "browser": { "name": "Chrome" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let stack = client
        .detect_with(CHROME_UA, &DetectOptions::default().fields("browser.name"))
        .await
        .unwrap();

    assert_eq!(stack.browser.name, "Chrome");
    assert_eq!(stack.entity_type, None);
    assert_eq!(stack.os.name, "");
}

#[tokio::test]
async fn unknown_entity_type_depends_on_decode_mode() {
    let server = MockServer::start().await;
    let mut body = chrome_body();
    body["type"] = json!("smart-assistant");
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let strict = client_for(&server).build().unwrap();
    match strict.detect(CHROME_UA).await {
        Err(UserstackError::UnsupportedType(e)) => {
            assert_eq!(e.field(), "entity");
            assert_eq!(e.value(), "smart-assistant");
        }
        other => panic!("expected unsupported type error, got {other:?}"),
    }

    let lenient = client_for(&server)
        .decode_mode(DecodeMode::Lenient)
        .build()
        .unwrap();
    let stack = lenient.detect(CHROME_UA).await.unwrap();
    assert_eq!(
        stack.entity_type,
        Some(EntityType::Other("smart-assistant".to_string()))
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let err = client.detect(CHROME_UA).await.unwrap_err();
    assert!(matches!(err, UserstackError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn per_call_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chrome_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let err = client
        .detect_with(
            CHROME_UA,
            &DetectOptions::default().timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    match err {
        UserstackError::Http(e) => assert!(e.is_timeout()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_is_shared_across_concurrent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chrome_body()))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();
    let cloned = client.clone();
    let (a, b, c) = tokio::join!(
        client.detect(CHROME_UA),
        client.detect(CHROME_UA),
        cloned.detect(CHROME_UA),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
}

// ---------------------------------------------------------------------------
// Debug logging
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn debug_log_never_contains_access_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .and(query_param("access_key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(chrome_body()))
        .expect(1)
        .mount(&server)
        .await;

    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(captured.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = client_for(&server).debug(true).build().unwrap();
    client.detect(CHROME_UA).await.unwrap();

    let logs = captured.contents();
    assert!(logs.contains("userstack: HTTP request"), "logs: {logs}");
    assert!(logs.contains("access_key=hidden"), "logs: {logs}");
    assert!(!logs.contains(KEY), "access key leaked: {logs}");
}

#[tokio::test]
async fn debug_disabled_logs_nothing_from_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chrome_body()))
        .mount(&server)
        .await;

    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(captured.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = client_for(&server).build().unwrap();
    client.detect(CHROME_UA).await.unwrap();

    assert!(!captured.contents().contains("userstack:"));
}

// ---------------------------------------------------------------------------
// Custom transport
// ---------------------------------------------------------------------------

struct Canned {
    body: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl HttpTransport for Canned {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/detect");
        assert!(request
            .url()
            .query_pairs()
            .any(|(k, v)| k == "access_key" && v == KEY));

        let response = http::Response::builder()
            .status(200)
            .body(self.body)
            .unwrap();
        Ok(reqwest::Response::from(response))
    }
}

#[tokio::test]
async fn custom_transport_is_used() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = ClientBuilder::new()
        .access_key(KEY)
        .secure(true)
        .transport(Canned {
            body: r#"{"success": false, "error": {"code": 105, "type": "https_access_restricted", "info": "Access Restricted - Your current Subscription Plan does not support HTTPS Encryption."}}"#,
            calls: calls.clone(),
        })
        .build()
        .unwrap();

    let err = client.detect(CHROME_UA).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        err.api_error().and_then(|e| e.error_type.clone()),
        Some(ErrorType::HttpsAccessRestricted)
    );
}

#[tokio::test]
async fn client_new_defaults_to_strict() {
    let client = Client::new(KEY, false).unwrap();
    assert_eq!(client.decode_mode(), DecodeMode::Strict);
}
