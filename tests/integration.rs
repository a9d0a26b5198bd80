//! End-to-end stage tests against mock HTTP services
//!
//! Each stage is wired to a wiremock server the way the pipeline wires
//! it to the real services, with the pacing delays zeroed out.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendscout::config::{OutputConfig, SearchConfig};
use trendscout::llm::{KeywordEnricher, LlmConfig};
use trendscout::models::{EnrichedHit, SearchHit, TimeWindow};
use trendscout::monitor::ScrapeOrchestrator;
use trendscout::report::{null_reporter, ChannelReporter, Reporter};
use trendscout::search::SearchFetcher;
use trendscout::storage::DatasetWriter;
use trendscout::trends::{
    eligible_keywords, rank::rank, TrendBatcher, TrendsClient, TrendsConfig,
};

fn search_config() -> SearchConfig {
    let mut config = SearchConfig::default();
    config.requests_per_second = 100;
    config
}

fn writer_in(dir: &Path) -> DatasetWriter {
    DatasetWriter::new(&OutputConfig {
        output_dir: dir.to_path_buf(),
        data_dir: dir.join("data"),
    })
}

const RESULT_PAGE: &str = r#"<html><body>
<div class="g"><a href="https://good.com/news/1"><h3>《黑神话》新预告</h3></a></div>
<div class="g"><a href="https://good.com/post/2"><h3>【原神】4.2版本</h3></a></div>
</body></html>"#;

/// One failing site must not disturb hits from the others
#[tokio::test]
async fn test_scrape_survives_failing_site() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:good.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:bad.com"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = SearchFetcher::with_base_url(&search_config(), &mock_server.uri()).unwrap();
    let mut orchestrator =
        ScrapeOrchestrator::new(fetcher, writer_in(dir.path()), null_reporter())
            .with_delay_secs(0.0, 0.0);

    let sites = vec!["bad.com".to_string(), "good.com".to_string()];
    let hits = orchestrator.run(&sites, &[TimeWindow::Day]).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.site == "good.com"));
    assert_eq!(hits[0].candidate_name.as_deref(), Some("黑神话"));

    // The run persisted exactly what it collected
    let saved = orchestrator.last_output().expect("dataset path");
    let loaded = DatasetWriter::read_hits(saved).unwrap();
    assert_eq!(loaded.len(), hits.len());
}

/// Both windows are visited for every site, and hits are stamped with
/// the window they came from
#[tokio::test]
async fn test_scrape_visits_both_windows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("tbs", "qdr:d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("tbs", "qdr:w"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = SearchFetcher::with_base_url(&search_config(), &mock_server.uri()).unwrap();
    let mut orchestrator =
        ScrapeOrchestrator::new(fetcher, writer_in(dir.path()), null_reporter())
            .with_delay_secs(0.0, 0.0);

    let sites = vec!["good.com".to_string()];
    let hits = orchestrator.run(&sites, &TimeWindow::all()).await.unwrap();

    assert_eq!(hits.len(), 4);
    assert_eq!(
        hits.iter().filter(|h| h.time_window == TimeWindow::Day).count(),
        2
    );
    assert_eq!(
        hits.iter().filter(|h| h.time_window == TimeWindow::Week).count(),
        2
    );
}

/// An empty run reports and persists nothing
#[tokio::test]
async fn test_scrape_with_no_results_writes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = SearchFetcher::with_base_url(&search_config(), &mock_server.uri()).unwrap();
    let (channel, mut receiver) = ChannelReporter::new();
    let reporter: Reporter = Arc::new(channel);
    let mut orchestrator = ScrapeOrchestrator::new(fetcher, writer_in(dir.path()), reporter)
        .with_delay_secs(0.0, 0.0);

    let hits = orchestrator
        .run(&["empty.com".to_string()], &[TimeWindow::Day])
        .await
        .unwrap();

    assert!(hits.is_empty());
    assert!(orchestrator.last_output().is_none());

    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    assert!(messages.iter().any(|m| m == "No results found"));
}

/// Enrichment against a mock chat-completions endpoint
#[tokio::test]
async fn test_enrich_against_mock_llm() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": " Black Myth Wukong \n"}}]
        })))
        .mount(&mock_server)
        .await;

    let config = LlmConfig {
        endpoint: mock_server.uri(),
        api_key: Some("test-key".to_string()),
        ..LlmConfig::default()
    };
    let enricher = KeywordEnricher::new(config, null_reporter()).unwrap();

    let hit = SearchHit {
        title: "《黑神话》新预告".to_string(),
        link: "https://good.com/news/1".to_string(),
        candidate_name: Some("黑神话".to_string()),
        site: "good.com".to_string(),
        time_window: TimeWindow::Day,
        observed_at: chrono::Utc::now(),
    };

    let enriched = enricher.enrich_all(vec![hit]).await;
    assert_eq!(enriched[0].keyword.as_deref(), Some("Black Myth Wukong"));
}

/// One rejected completion degrades that hit only
#[tokio::test]
async fn test_enrich_failure_degrades_single_hit() {
    let mock_server = MockServer::start().await;

    // First call is rejected, the second succeeds
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "genshin impact"}}]
        })))
        .mount(&mock_server)
        .await;

    let config = LlmConfig {
        endpoint: mock_server.uri(),
        api_key: Some("test-key".to_string()),
        ..LlmConfig::default()
    };
    let enricher = KeywordEnricher::new(config, null_reporter()).unwrap();

    let hit = |title: &str| SearchHit {
        title: title.to_string(),
        link: "https://good.com/news/1".to_string(),
        candidate_name: None,
        site: "good.com".to_string(),
        time_window: TimeWindow::Day,
        observed_at: chrono::Utc::now(),
    };

    let enriched = enricher.enrich_all(vec![hit("first"), hit("second")]).await;
    assert!(enriched[0].keyword.is_none());
    assert_eq!(enriched[1].keyword.as_deref(), Some("genshin impact"));
}

fn trend_response(series: serde_json::Value) -> serde_json::Value {
    json!({
        "dates": ["2024-05-01", "2024-05-02", "2024-05-03"],
        "series": series,
    })
}

/// Three keywords split into two batches; the merged table ranks by
/// percent increase and skips the partial-data marker column
#[tokio::test]
async fn test_trend_stage_batches_merges_and_ranks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interest_over_time"))
        .and(body_partial_json(json!({"keywords": ["alpha", "beta"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_response(json!({
            "alpha": [10.0, 20.0, 40.0],
            "beta": [50.0, 50.0, 55.0],
            "isPartial": [0.0, 0.0, 1.0],
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/interest_over_time"))
        .and(body_partial_json(json!({"keywords": ["gamma"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_response(json!({
            "gamma": [20.0, 30.0, 50.0],
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TrendsConfig {
        endpoint: mock_server.uri(),
        ..TrendsConfig::default()
    };
    let client = TrendsClient::new(config).unwrap();
    let batcher = TrendBatcher::new(client, null_reporter()).with_delay_secs(0.0, 0.0);

    let keywords: Vec<String> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    let series = batcher.fetch_trends(&keywords).await;

    assert_eq!(series.columns(), &["alpha", "beta", "isPartial", "gamma"]);

    let links = keywords
        .iter()
        .map(|k| (k.clone(), format!("https://good.com/news/{k}")))
        .collect();
    let summaries = rank(&series, &links);

    // alpha +300%, gamma +150%, beta +10%; isPartial never ranked
    let ranked: Vec<&str> = summaries.iter().map(|s| s.keyword.as_str()).collect();
    assert_eq!(ranked, vec!["alpha", "gamma", "beta"]);
    assert!((summaries[0].percent_increase - 300.0).abs() < f64::EPSILON);
    assert_eq!(summaries[0].link, "https://good.com/news/alpha");
}

/// A failed batch is skipped; other batches still contribute
#[tokio::test]
async fn test_failed_batch_is_isolated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interest_over_time"))
        .and(body_partial_json(json!({"keywords": ["alpha", "beta"]})))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/interest_over_time"))
        .and(body_partial_json(json!({"keywords": ["gamma"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_response(json!({
            "gamma": [20.0, 30.0, 50.0],
        }))))
        .mount(&mock_server)
        .await;

    let config = TrendsConfig {
        endpoint: mock_server.uri(),
        ..TrendsConfig::default()
    };
    let client = TrendsClient::new(config).unwrap();
    let batcher = TrendBatcher::new(client, null_reporter()).with_delay_secs(0.0, 0.0);

    let keywords: Vec<String> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    let series = batcher.fetch_trends(&keywords).await;

    assert_eq!(series.columns(), &["gamma"]);
}

/// Dataset chain: scrape file → enriched `_update` file → keyword
/// selection with the link-exclusion rule applied
#[tokio::test]
async fn test_dataset_chain_to_keyword_selection() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_in(dir.path());

    let hit = |n: u32, link: &str| SearchHit {
        title: format!("title {n}"),
        link: link.to_string(),
        candidate_name: None,
        site: "good.com".to_string(),
        time_window: TimeWindow::Day,
        observed_at: chrono::Utc::now(),
    };

    let hits = vec![
        hit(1, "https://good.com/news/1"),
        hit(2, "https://good.com/post/2"),
    ];
    let scrape_path = writer.write_hits(&hits).unwrap();

    let enriched: Vec<_> = DatasetWriter::read_hits(&scrape_path)
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, h)| EnrichedHit::from_hit(h, Some(format!("kw{i}"))))
        .collect();
    let enriched_path = writer.write_enriched(&enriched, &scrape_path).unwrap();

    let reloaded = DatasetWriter::read_enriched(&enriched_path).unwrap();
    let (keywords, links) = eligible_keywords(&reloaded);

    // The /post/ link is excluded before batching
    assert_eq!(keywords, vec!["kw0"]);
    assert_eq!(links["kw0"], "https://good.com/news/1");
}

/// The persisted (site, url, keyword) set is identical after reload,
/// independent of row order
#[tokio::test]
async fn test_enriched_roundtrip_preserves_record_set() {
    use std::collections::HashSet;

    let dir = tempfile::tempdir().unwrap();
    let writer = writer_in(dir.path());

    let hit = |n: u32| SearchHit {
        title: format!("title {n}"),
        link: format!("https://good.com/news/{n}"),
        candidate_name: Some(format!("game {n}")),
        site: format!("site{n}.com"),
        time_window: TimeWindow::Week,
        observed_at: chrono::Utc::now(),
    };

    let scrape_path = writer.write_hits(&[hit(3), hit(1), hit(2)]).unwrap();
    let enriched: Vec<_> = [hit(3), hit(1), hit(2)]
        .into_iter()
        .map(|h| {
            let keyword = format!("kw-{}", h.site);
            EnrichedHit::from_hit(h, Some(keyword))
        })
        .collect();
    let enriched_path = writer.write_enriched(&enriched, &scrape_path).unwrap();

    let expected: HashSet<(String, String, Option<String>)> = enriched
        .iter()
        .map(|h| (h.site.clone(), h.link.clone(), h.keyword.clone()))
        .collect();
    let reloaded: HashSet<(String, String, Option<String>)> =
        DatasetWriter::read_enriched(&enriched_path)
            .unwrap()
            .into_iter()
            .map(|h| (h.site, h.link, h.keyword))
            .collect();

    assert_eq!(reloaded, expected);
}

/// Raw trend table round-trips through its wide CSV layout
#[tokio::test]
async fn test_trend_series_csv_layout() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_in(dir.path());

    let mut series = trendscout::trends::TrendSeries::new();
    let dates: Vec<_> = (1..=2)
        .map(|d| chrono::NaiveDate::from_ymd_opt(2024, 5, d).unwrap())
        .collect();
    series.insert_column("alpha", &dates, &[Some(10.0), Some(20.0)]);
    series.insert_column("beta", &dates, &[None, Some(5.0)]);

    let path = writer.write_trend_series(&series).unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("genai_trends_raw_30days_"));

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("date,alpha,beta"));
    // Missing cell stays empty rather than zero-filled
    assert_eq!(lines.next(), Some("2024-05-01,10,"));
    assert_eq!(lines.next(), Some("2024-05-02,20,5"));
}
