
use newsrank::fetcher::{FeedClient, FetchError, USER_AGENT, client::DEFAULT_TIMEOUT};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn client() -> FeedClient {
    FeedClient::new(DEFAULT_TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_fetch_rss_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixtures::rss(&[
                    ("First", "<p>One</p>", "https://example.com/1"),
                    ("Second", "Two", "https://example.com/2"),
                ]))
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let feed = client().fetch(&url).await.unwrap();

    assert_eq!(feed.source_url, url);
    assert_eq!(feed.items.len(), 2);
    assert_eq!(feed.items[0].title, "First");
    assert_eq!(feed.items[0].link.as_deref(), Some("https://example.com/1"));
    assert!(feed.items[0].published_at.is_some());

    // the agent contains commas, so compare the raw header value
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers["user-agent"], USER_AGENT);
}

#[tokio::test]
async fn test_fetch_atom_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/atom"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixtures::ATOM)
                .insert_header("Content-Type", "application/atom+xml"),
        )
        .mount(&mock_server)
        .await;

    let feed = client()
        .fetch(&format!("{}/atom", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(feed.items.len(), 1);
    assert_eq!(
        feed.items[0].description,
        "A faster processor for machine learning workloads."
    );
}

#[tokio::test]
async fn test_fetch_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = client()
        .fetch(&format!("{}/notfound", mock_server.uri()))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, FetchError::Http { status } if status.as_u16() == 404));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_fetch_500_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = client()
        .fetch(&format!("{}/error", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { status } if status.as_u16() == 500));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_follows_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::ATOM))
        .mount(&mock_server)
        .await;

    let feed = client()
        .fetch(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(feed.items.len(), 1);
}

#[tokio::test]
async fn test_fetch_gzip_compression() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let original = fixtures::rss(&[("Compressed", "Gzipped body", "https://example.com/gz")]);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(original.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gzipped"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("Content-Type", "application/rss+xml")
                .insert_header("Content-Encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let feed = client()
        .fetch(&format!("{}/gzipped", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(feed.items[0].title, "Compressed");
}

#[tokio::test]
async fn test_fetch_malformed_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>not a feed</body></html>"))
        .mount(&mock_server)
        .await;

    let err = client()
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_fetch_body_too_large() {
    let mock_server = MockServer::start().await;
    let large_body = "x".repeat(6 * 1024 * 1024);

    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(large_body.as_bytes()))
        .mount(&mock_server)
        .await;

    let err = client()
        .fetch(&format!("{}/large", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::BodyTooLarge(size) if size == 6 * 1024 * 1024));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixtures::ATOM)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = FeedClient::new(Duration::from_millis(200))
        .unwrap()
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RequestTimeout));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    let result = client().fetch("not-a-valid-url").await;
    assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
}
