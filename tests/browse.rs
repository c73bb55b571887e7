// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end browsing tests against a local mock server

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mustekala::{Error, MemoryCache, RetryPolicy, Session, SessionOptions};

// Set RUST_LOG to see client traces while debugging a test run.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.to_string())
}

#[tokio::test]
async fn test_open_parses_page_and_counts_requests() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><head><title>Etusivu</title></head><body>moi</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    let page = session.open(server.uri()).await.unwrap();

    assert!(page.is_success());
    assert_eq!(page.title().as_deref(), Some("Etusivu"));
    assert_eq!(session.total_requests(), 1);
    assert_eq!(session.visited().len(), 1);
}

#[tokio::test]
async fn test_form_submission_posts_encoded_fields() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html(
            r#"<form action="/post" method="post"><input name="a" value="x"></form>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post"))
        .and(body_string("a=x"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(html("<p>done</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    let page = session
        .open(format!("{}/page", server.uri()))
        .await
        .unwrap();
    let form = page.get_form().unwrap();
    let result = page.submit_form(&form).await.unwrap();

    assert!(result.is_success());
    assert!(result.text().contains("done"));
    assert_eq!(result.url().path(), "/post");
}

#[tokio::test]
async fn test_retry_recovers_from_transient_status() {
    init_tracing();
    let server = MockServer::start().await;
    // First hit fails, the mounted fallback then succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>recovered</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let options = SessionOptions::new().retry(RetryPolicy {
        backoff_base: Duration::from_millis(1),
        ..RetryPolicy::with_max_attempts(3)
    });
    let session = Session::with_options(options).unwrap();
    let page = session
        .open(format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status_code(), 200);
    assert!(page.text().contains("recovered"));
}

#[tokio::test]
async fn test_disabled_retry_returns_error_status() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    let page = session
        .open(format!("{}/down", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.status_code(), 503);
}

#[tokio::test]
async fn test_raise_on_status() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = Session::with_options(SessionOptions::new().raise_on_status(true)).unwrap();
    let err = session
        .open(format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    // Failed navigations never land in history
    assert!(session.visited().is_empty());
}

#[tokio::test]
async fn test_click_link_sends_referer() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(html(r#"<a href="/next">Jatka</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .and(header("referer", format!("{}/start", server.uri()).as_str()))
        .respond_with(html("<title>Next</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    let page = session
        .open(format!("{}/start", server.uri()))
        .await
        .unwrap();
    let next = page.click_link_by_text("jatka").await.unwrap();

    assert_eq!(next.title().as_deref(), Some("Next"));
    assert_eq!(next.url().path(), "/next");
}

#[tokio::test]
async fn test_history_back_and_forward_refetch() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(html("<title>One</title>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2"))
        .respond_with(html("<title>Two</title>"))
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    session.open(format!("{}/1", server.uri())).await.unwrap();
    session.open(format!("{}/2", server.uri())).await.unwrap();

    let back = session.back(1).await.unwrap();
    assert_eq!(back.url().path(), "/1");

    let forward = session.forward(1).await.unwrap();
    assert_eq!(forward.url().path(), "/2");

    // Every navigation was an actual request
    assert_eq!(session.total_requests(), 4);
    assert_eq!(session.visited().len(), 4);
}

#[tokio::test]
async fn test_cookies_persist_across_sessions() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("<p>ok</p>").insert_header("set-cookie", "sid=abc123; Path=/"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cookie_file = dir.path().join("cookies.json");

    let session = Session::new().unwrap();
    session
        .open(format!("{}/login", server.uri()))
        .await
        .unwrap();
    assert_eq!(session.cookie_jar().len(), 1);
    session.save_cookies(&cookie_file).unwrap();

    let restored = Session::new().unwrap();
    restored.load_cookies(&cookie_file).unwrap();
    assert_eq!(restored.cookie_jar().len(), 1);

    let url = url::Url::parse(&format!("{}/x", server.uri())).unwrap();
    assert_eq!(
        restored.cookie_jar().get_cookie_header(&url).as_deref(),
        Some("sid=abc123")
    );
}

#[tokio::test]
async fn test_load_cookies_replaces_jar_contents() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cookie_file = dir.path().join("cookies.json");

    let saved = Session::new().unwrap();
    saved
        .cookie_jar()
        .add(mustekala::Cookie::new("sid", "fresh").domain("example.com"));
    saved.save_cookies(&cookie_file).unwrap();

    // Pre-existing cookies are dropped on load, not merged
    let session = Session::new().unwrap();
    session
        .cookie_jar()
        .add(mustekala::Cookie::new("stale", "1").domain("other.org"));
    session.load_cookies(&cookie_file).unwrap();

    assert_eq!(session.cookie_jar().len(), 1);
    let url = url::Url::parse("https://example.com/").unwrap();
    assert_eq!(
        session.cookie_jar().get_cookie_header(&url).as_deref(),
        Some("sid=fresh")
    );
    let other = url::Url::parse("https://other.org/").unwrap();
    assert!(session.cookie_jar().get_cookie_header(&other).is_none());
}

#[tokio::test]
async fn test_load_cookies_missing_file_is_noop() {
    init_tracing();
    let session = Session::new().unwrap();
    session.load_cookies("/nonexistent/cookies.json").unwrap();
    assert!(session.cookie_jar().is_empty());
}

#[tokio::test]
async fn test_cache_serves_second_open_without_request() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(html("<title>Cached</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let options = SessionOptions::new().cache(Arc::new(MemoryCache::new()));
    let session = Session::with_options(options).unwrap();

    let first = session
        .open(format!("{}/cached", server.uri()))
        .await
        .unwrap();
    assert!(!first.from_cache());

    let second = session
        .open(format!("{}/cached", server.uri()))
        .await
        .unwrap();
    assert!(second.from_cache());
    assert_eq!(second.title().as_deref(), Some("Cached"));

    // Cache hits still count as requests and land in history
    assert_eq!(session.total_requests(), 2);
    assert_eq!(session.visited().len(), 2);
}

#[tokio::test]
async fn test_robots_txt_disallow_blocks_navigation() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(html("<p>open</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let session =
        Session::with_options(SessionOptions::new().obey_robots_txt(true)).unwrap();

    let err = session
        .open(format!("{}/private/page", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DisallowedByRobots { .. }));

    // The rules are cached per origin, and allowed paths go through
    let page = session
        .open(format!("{}/public", server.uri()))
        .await
        .unwrap();
    assert!(page.is_success());
}

#[tokio::test]
async fn test_missing_robots_txt_allows_everything() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/anything"))
        .respond_with(html("<p>fine</p>"))
        .mount(&server)
        .await;

    let session =
        Session::with_options(SessionOptions::new().obey_robots_txt(true)).unwrap();
    let page = session
        .open(format!("{}/anything", server.uri()))
        .await
        .unwrap();
    assert!(page.is_success());
}

#[tokio::test]
async fn test_download_file() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/data.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("sisalto"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = Session::new().unwrap();
    let path = session
        .download_file(format!("{}/files/data.txt", server.uri()), dir.path())
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "data.txt");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "sisalto");
}

#[test]
fn test_blocking_facade_round_trip() {
    init_tracing();
    use mustekala::blocking;

    // The mock server needs its own runtime since the blocking session
    // owns one of its own.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(r#"<title>Sync</title><a href="/next">go</a>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/next"))
            .respond_with(html("<title>There</title>"))
            .mount(&server)
            .await;
        server
    });

    let session = blocking::Session::new().unwrap();
    let page = session.open(server.uri()).unwrap();
    assert_eq!(page.title().as_deref(), Some("Sync"));

    let next = page.click_link_by_text("go").unwrap();
    assert_eq!(next.title().as_deref(), Some("There"));
    assert_eq!(session.total_requests(), 2);
}
