//! Behavior-driven tests for error handling and input hardening.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use liquiscope_core::{
    CacheConfig, CacheReader, DeliveryStatus, HttpClient, HttpError, HttpRequest, HttpResponse,
    RecordSource, Selection, TelegramConfig, TelegramNotifier, ValidationError, WarehouseError,
};
use liquiscope_tests::{symbol, CacheFixture};

// =============================================================================
// Input validation
// =============================================================================

#[test]
fn symbol_text_is_bound_not_interpolated() {
    // Given: A populated cache
    let cache = CacheFixture::standard();

    // When: A symbol shaped like SQL is requested
    let records = cache
        .reader()
        .fetch_records(&symbol("AAA'OR'1'='1"))
        .expect("query runs");

    // Then: It matches nothing and the table is untouched
    assert!(records.is_empty());
    assert_eq!(RecordSource::list_symbols(&cache.reader()).expect("catalog").len(), 3);
}

#[test]
fn table_names_must_be_plain_identifiers() {
    // Given/When: A table name carrying SQL
    let mut config = CacheConfig::at("cache.duckdb");
    config.table = String::from("asset_data; DROP TABLE asset_data");

    // Then: The reader refuses to open
    assert!(matches!(
        CacheReader::open(config),
        Err(WarehouseError::InvalidTable(_))
    ));
}

#[test]
fn selection_rejects_bad_symbols_dates_and_inverted_windows() {
    assert!(matches!(
        Selection::parse(Some("A B"), None, None),
        Err(ValidationError::SymbolInvalidChar { .. })
    ));
    assert!(matches!(
        Selection::parse(Some("AAA"), Some("2024-02-30"), Some("2024-03-01")),
        Err(ValidationError::InvalidDate { .. })
    ));
    assert!(matches!(
        Selection::parse(Some("AAA"), Some("2024-03-02"), Some("2024-03-01")),
        Err(ValidationError::InvertedDateWindow { .. })
    ));
}

#[test]
fn reader_never_writes_to_the_cache() {
    // Given: A cache and a reader over it
    let cache = CacheFixture::standard();
    let before = std::fs::metadata(cache.path()).expect("metadata").len();

    // When: The reader runs several queries
    for _ in 0..3 {
        let _ = RecordSource::list_symbols(&cache.reader()).expect("catalog");
    }

    // Then: The file is unchanged in size
    let after = std::fs::metadata(cache.path()).expect("metadata").len();
    assert_eq!(before, after);
}

// =============================================================================
// Notifier
// =============================================================================

struct CapturingClient {
    requests: Mutex<Vec<HttpRequest>>,
}

impl HttpClient for CapturingClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let url = request.url.clone();
        self.requests.lock().expect("lock").push(request);
        Box::pin(async move { Err(HttpError::new(format!("connection failed: {url}"))) })
    }
}

#[tokio::test]
async fn failed_delivery_is_reported_without_leaking_the_token() {
    // Given: A notifier whose endpoint is unreachable
    let client = Arc::new(CapturingClient {
        requests: Mutex::new(Vec::new()),
    });
    let notifier = TelegramNotifier::new(
        TelegramConfig::new("999:top-secret", "12345"),
        client.clone(),
    );

    // When: An alert is sent
    let status = notifier.send_alert("AAA amihud spike").await;

    // Then: The caller gets a failure status, exactly one attempt was made,
    // and the token does not appear anywhere in the outcome
    assert!(matches!(status, DeliveryStatus::Failed { .. }));
    assert_eq!(client.requests.lock().expect("lock").len(), 1);
    let rendered = serde_json::to_string(&status).expect("json");
    assert!(!rendered.contains("top-secret"));
    assert!(!format!("{notifier:?}").contains("top-secret"));
}
