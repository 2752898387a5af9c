//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small sites and run the full crawl
//! cycle end-to-end through the real HTTP gateway.

use linkweave::config::{FetchConfig, StrategyOrder};
use linkweave::crawler::{
    cancel_pair, start_crawl, CancelToken, CrawlEngine, CrawlOptions, FetchGateway,
};
use linkweave::{UrlError, WeaveError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Direct requests only, short delays
fn direct_gateway() -> FetchGateway {
    let config = FetchConfig {
        strategy_order: StrategyOrder::DirectFirst,
        relays: vec![],
        base_delay_ms: 10,
        attempt_timeout_secs: 5,
        user_agent: "linkweave-test/1.0".to_string(),
    };
    FetchGateway::from_config(&config).expect("Failed to build gateway")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_origin() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/page1">One</a>
           <a href="/page2">Two</a>
           <a href="https://external.example/">Elsewhere</a>
           <form action="/search"></form>"#,
        1,
    )
    .await;
    mount_page(&server, "/page1", r#"<a href="/page3">Three</a><a href="/">Home</a>"#, 1).await;
    mount_page(&server, "/page3", "", 0).await;
    mount_page(&server, "/search", "", 1).await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let engine = CrawlEngine::new(direct_gateway());
    let options = CrawlOptions {
        max_depth: 1,
        same_origin_only: true,
        max_pages: 50,
    };

    let result = start_crawl(&base, &options, &engine, &CancelToken::never())
        .await
        .expect("Crawl failed");

    assert_eq!(result.seed, format!("{}/", base));
    assert_eq!(
        result.urls,
        vec![
            format!("{}/page1", base),
            format!("{}/page2", base),
            format!("{}/search", base),
            format!("{}/page3", base),
            format!("{}/", base),
        ]
    );
    assert_eq!(result.url_count, 5);
    assert_eq!(result.pages_visited, 4);
    assert_eq!(result.fetch_failures, 1);
}

#[tokio::test]
async fn test_page_budget_limits_fetches() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", "", 0).await;
    mount_page(&server, "/b", "", 0).await;
    mount_page(&server, "/c", "", 0).await;

    let engine = CrawlEngine::new(direct_gateway());
    let options = CrawlOptions {
        max_depth: 2,
        same_origin_only: true,
        max_pages: 1,
    };

    let result = start_crawl(&server.uri(), &options, &engine, &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 1);
    assert_eq!(result.url_count, 3);
}

#[tokio::test]
async fn test_cross_origin_crawl() {
    let home = MockServer::start().await;
    let away = MockServer::start().await;

    mount_page(
        &home,
        "/",
        &format!(r#"<a href="{}/landing">Away</a>"#, away.uri()),
        1,
    )
    .await;
    mount_page(&away, "/landing", r#"<a href="/next">Next</a>"#, 1).await;
    mount_page(&away, "/next", "", 0).await;

    let engine = CrawlEngine::new(direct_gateway()).with_concurrency(4);
    let options = CrawlOptions {
        max_depth: 1,
        same_origin_only: false,
        max_pages: 10,
    };

    let result = start_crawl(&home.uri(), &options, &engine, &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(
        result.urls,
        vec![format!("{}/landing", away.uri()), format!("{}/next", away.uri())]
    );
}

#[tokio::test]
async fn test_same_origin_filter_skips_other_servers() {
    let home = MockServer::start().await;
    let away = MockServer::start().await;

    mount_page(
        &home,
        "/",
        &format!(r#"<a href="{}/landing">Away</a><a href="/local">Local</a>"#, away.uri()),
        1,
    )
    .await;
    mount_page(&home, "/local", "", 1).await;
    mount_page(&away, "/landing", "", 0).await;

    let engine = CrawlEngine::new(direct_gateway());
    let options = CrawlOptions {
        max_depth: 3,
        same_origin_only: true,
        max_pages: 10,
    };

    let result = start_crawl(&home.uri(), &options, &engine, &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.urls, vec![format!("{}/local", home.uri())]);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected_before_fetching() {
    let engine = CrawlEngine::new(direct_gateway());

    let result = start_crawl("", &CrawlOptions::default(), &engine, &CancelToken::never()).await;

    assert!(matches!(result, Err(WeaveError::Url(UrlError::Empty))));
}

#[tokio::test]
async fn test_mail_links_are_discovered_but_not_requested() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="mailto:hello@example.com">Mail</a><a href="/about">About</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/about", "", 1).await;

    let engine = CrawlEngine::new(direct_gateway());
    let options = CrawlOptions {
        max_depth: 1,
        same_origin_only: false,
        max_pages: 10,
    };

    let result = start_crawl(&server.uri(), &options, &engine, &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(
        result.urls,
        vec![
            "mailto:hello@example.com".to_string(),
            format!("{}/about", server.uri()),
        ]
    );
    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.fetch_failures, 1);
}

#[tokio::test]
async fn test_unfetchable_seed_yields_empty_crawl() {
    let engine = CrawlEngine::new(direct_gateway());

    let result = start_crawl(
        "ftp://files.example.com/",
        &CrawlOptions::default(),
        &engine,
        &CancelToken::never(),
    )
    .await
    .unwrap();

    assert_eq!(result.seed, "ftp://files.example.com/");
    assert!(result.urls.is_empty());
    assert_eq!(result.pages_visited, 1);
    assert_eq!(result.fetch_failures, 1);
}

#[tokio::test]
async fn test_cancelled_crawl_returns_no_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let engine = CrawlEngine::new(direct_gateway());
    let (handle, token) = cancel_pair();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let started = std::time::Instant::now();
    let result = start_crawl(&server.uri(), &CrawlOptions::default(), &engine, &token).await;

    assert!(matches!(result, Err(WeaveError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3));
}
