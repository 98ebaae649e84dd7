use almasry_scraper::{
    config::{DelayRange, ScraperConfig},
    sink, ArticleRecord, Fetcher, NewsSearch, ScraperError,
};
use mockito::Matcher;

const LISTING: &str = r#"
<!DOCTYPE html>
<html>
    <body>
        <div class="last_news">
            <ul>
                <li>
                    <a href="/news/details/3100001"><img src="https://img.almasryalyoum.com/a.jpg"></a>
                    <div class="wrap"><p class="time">منذ ساعة</p><p>سد النهضة: بيان جديد</p></div>
                </li>
                <li>
                    <a href="/news/details/3100002"></a>
                    <div class="wrap"><p>Missing time</p></div>
                </li>
                <li>
                    <a href="/news/details/3100003"></a>
                    <div class="wrap"><p class="time">منذ يومين</p><p>Third story</p></div>
                </li>
            </ul>
        </div>
    </body>
</html>
"#;

fn config_for(server: &mockito::ServerGuard) -> ScraperConfig {
    ScraperConfig {
        base_url: server.url(),
        max_attempts: 3,
        delay_range: DelayRange::new(0, 0).unwrap(),
        ..ScraperConfig::default()
    }
}

/// Tests the whole search against a mock site, including the browser headers.
#[tokio::test]
async fn test_full_search_workflow() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/news/search")
        .match_query(Matcher::UrlEncoded("keyword".into(), "سد النهضة".into()))
        .match_header("referer", "https://www.google.com/")
        .match_header("dnt", "1")
        .match_header("user-agent", Matcher::Regex("Chrome/".into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(LISTING)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let search = NewsSearch::new(&config).unwrap();

    let articles = search.scrape_articles("سد النهضة", 10).await;

    mock.assert_async().await;
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "سد النهضة: بيان جديد");
    assert_eq!(articles[0].url, format!("{}/news/details/3100001", server.url()));
    assert_eq!(articles[0].image.as_deref(), Some("https://img.almasryalyoum.com/a.jpg"));
    assert_eq!(articles[1].title, "Third story");
    assert_eq!(articles[1].image, None);
}

/// Tests that a blocked site is requested once per attempt and gives no articles.
#[tokio::test]
async fn test_blocked_site_exhausts_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/news/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Checking your browser")
        .expect(3)
        .create_async()
        .await;

    let config = config_for(&server);
    let search = NewsSearch::new(&config).unwrap();

    let articles = search.scrape_articles("economy", 10).await;

    mock.assert_async().await;
    assert!(articles.is_empty());
}

/// Tests that the fetcher reports exhaustion with the last status it saw.
#[tokio::test]
async fn test_fetcher_reports_last_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/page")
        .with_status(403)
        .expect(2)
        .create_async()
        .await;

    let config = ScraperConfig {
        max_attempts: 2,
        ..config_for(&server)
    };
    let fetcher = Fetcher::from_config(&config).unwrap();

    let err = fetcher
        .fetch(&format!("{}/page", server.url()))
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        ScraperError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, ScraperError::StatusError(403)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Tests that the scraped listing survives a trip through the JSON file.
#[tokio::test]
async fn test_results_round_trip_through_file() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/news/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(LISTING)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = ScraperConfig {
        output_path: dir.path().join("response").join("results.json"),
        ..config_for(&server)
    };
    let articles = NewsSearch::new(&config)
        .unwrap()
        .scrape_articles("سد النهضة", 1)
        .await;
    assert_eq!(articles.len(), 1);

    sink::save_to_json(&articles, &config.output_path).await.unwrap();

    let saved: Vec<ArticleRecord> =
        serde_json::from_str(&std::fs::read_to_string(&config.output_path).unwrap()).unwrap();
    assert_eq!(saved, articles);
}
