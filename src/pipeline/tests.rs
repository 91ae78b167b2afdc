use super::*;
use crate::boards::{HhFamilyBoard, SuperJobBoard};
use crate::catalog::QueryTarget;
use crate::config::{RunnerConfig, SortOrder, WebhookSettings};
use crate::core::retry::{RetryCategory, RetryConfig};
use crate::core::{BoardSession, JobBoard};
use crate::delivery::{PayloadFormat, WebhookSink};
use crate::models::VacancyId;
use crate::scrapers::{HttpScraper, Scraper};
use crate::storage::{DiskStorage, VacancyStore};
use crate::ScoutError;
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_config(dir: &TempDir) -> RunnerConfig {
    RunnerConfig {
        state_dir: dir.path().to_path_buf(),
        page_delay_ms: 0,
        max_vacancy_delay_ms: 0,
        ..RunnerConfig::default()
    }
}

fn quick_retry() -> RetryConfig {
    let mut retry = RetryConfig::default();
    for config in retry.categories.values_mut() {
        config.initial_delay = Duration::from_millis(10);
        config.max_delay = Duration::from_millis(10);
    }
    retry
}

fn sink(server: &MockServer) -> WebhookSink {
    WebhookSink::new(
        vec![WebhookSettings {
            url: Url::parse(&server.uri()).unwrap().join("/hook").unwrap(),
            format: PayloadFormat::Contacts,
        }],
        &RetryConfig::empty(),
    )
}

fn moscow_drivers() -> QueryTarget {
    QueryTarget {
        country: "Россия".to_string(),
        region: "Москва".to_string(),
        location_id: "1".to_string(),
        location_name: "Москва".to_string(),
        role_id: "10".to_string(),
        role_name: "Водитель".to_string(),
    }
}

fn single_vacancy_page() -> serde_json::Value {
    json!({
        "vacancySearchResult": {
            "vacancies": [{
                "vacancyId": 5,
                "name": "Водитель",
                "company": {"id": 77, "name": "ООО Ромашка"},
                "area": {"name": "Москва"},
                "links": {"desktop": "https://hh.ru/vacancy/5"},
                "@showContact": true
            }]
        }
    })
}

async fn mount_contacts(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/vacancy/5/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fio": "Иванов Иван",
            "email": "hr@romashka.ru"
        })))
        .mount(server)
        .await;
}

async fn run_crawl(
    board: &dyn JobBoard,
    scraper: &dyn Scraper,
    store: &dyn VacancyStore,
    sink: &WebhookSink,
    config: &RunnerConfig,
    retry: &RetryConfig,
    target: &QueryTarget,
) -> crate::ScoutResult<CrawlReport> {
    let order = SortOrder::default();
    let crawl = TargetCrawl {
        board,
        scraper,
        store,
        sink,
        retry,
        config,
        order: &order,
    };
    crawl.run(target, &mut BoardSession::default()).await
}

#[tokio::test]
async fn test_single_page_is_delivered_once_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_vacancy_page()))
        .expect(2)
        .mount(&server)
        .await;
    mount_contacts(&server).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::headhunter()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());
    let sink = sink(&server);

    let report = run_crawl(&board, &scraper, &store, &sink, &config, &retry, &moscow_drivers())
        .await
        .unwrap();
    assert_eq!(
        report,
        CrawlReport {
            pages: 1,
            delivered: 1
        }
    );
    let seen = store.load_seen().await.unwrap();
    assert_eq!(seen, BTreeSet::from([VacancyId::from(5)]));

    // A later run sees the same page but delivers nothing new.
    let report = run_crawl(&board, &scraper, &store, &sink, &config, &retry, &moscow_drivers())
        .await
        .unwrap();
    assert_eq!(report.delivered, 0);
    assert!(store.load_seen().await.unwrap().is_superset(&seen));

    let log = std::fs::read_to_string(store.log_path()).unwrap();
    assert_eq!(
        log,
        "Водитель;ООО Ромашка;https://hh.ru/vacancy/5;Иванов Иван;hr@romashka.ru;;Москва\n"
    );
}

#[tokio::test]
async fn test_stale_version_is_refreshed_and_page_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .respond_with(ResponseTemplate::new(406))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("hhtmFrom", "vacancy_search_filter"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<script>var globalVars = {build: "25.7.0"};</script>"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .and(header("X-Static-Version", "25.7.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_vacancy_page()))
        .expect(1)
        .mount(&server)
        .await;
    mount_contacts(&server).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::zarplata()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());

    let report = run_crawl(
        &board,
        &scraper,
        &store,
        &sink(&server),
        &config,
        &retry,
        &moscow_drivers(),
    )
    .await
    .unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(
        scraper.stats().get_stats().retry_reasons.get("stale_version"),
        Some(&1)
    );
}

#[tokio::test]
async fn test_stale_version_retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .respond_with(ResponseTemplate::new(406))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("hhtmFrom", "vacancy_search_filter"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"build: "1.0""#))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::headhunter()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());

    let err = run_crawl(
        &board,
        &scraper,
        &store,
        &sink(&server),
        &config,
        &retry,
        &moscow_drivers(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ScoutError::MaxRetriesReached {
            category: RetryCategory::StaleVersion,
            attempts: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rejected_webhook_still_marks_vacancy_seen() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_vacancy_page()))
        .mount(&server)
        .await;
    mount_contacts(&server).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad payload"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::headhunter()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());

    run_crawl(
        &board,
        &scraper,
        &store,
        &sink(&server),
        &config,
        &retry,
        &moscow_drivers(),
    )
    .await
    .unwrap();

    assert!(store
        .load_seen()
        .await
        .unwrap()
        .contains(&VacancyId::from(5)));
    assert_eq!(scraper.stats().get_stats().webhooks_rejected, 1);
}

#[tokio::test]
async fn test_offset_paging_runs_until_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jsapi3/0.1/vacancy/"))
        .and(query_param("page[offset]", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "48213977", "type": "vacancy"}],
            "included": [
                {"id": "48213977", "type": "vacancyMainInfo", "attributes": {"profession": "Кассир"}},
                {"id": "48213977", "type": "vacancyContactInfo", "attributes": {
                    "isContactPersonHidden": false, "email": "hr@shop.ru"
                }}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jsapi3/0.1/vacancy/"))
        .and(query_param("page[offset]", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "included": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = SuperJobBoard::new()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());
    let target = QueryTarget {
        location_id: "13".to_string(),
        location_name: "Казань".to_string(),
        role_id: "464".to_string(),
        role_name: "Кассир".to_string(),
        ..moscow_drivers()
    };

    let report = run_crawl(&board, &scraper, &store, &sink(&server), &config, &retry, &target)
        .await
        .unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(
        store.load_seen().await.unwrap(),
        BTreeSet::from([VacancyId::from("48213977")])
    );
    let raw = std::fs::read_to_string(store.json_path()).unwrap();
    assert_eq!(raw, r#"{"vacanciesId":["48213977"]}"#);
}

#[tokio::test]
async fn test_page_cap_limits_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vacancySearchResult": {"vacancies": [], "paging": {"next": {"page": 99}}}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = RunnerConfig {
        page_cap: 3,
        ..quick_config(&dir)
    };
    let retry = quick_retry();
    let board = HhFamilyBoard::headhunter()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());

    let report = run_crawl(
        &board,
        &scraper,
        &store,
        &sink(&server),
        &config,
        &retry,
        &moscow_drivers(),
    )
    .await
    .unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.delivered, 0);
}

#[tokio::test]
async fn test_zarplata_holds_vacancies_without_contacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_vacancy_page()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vacancy/5/contacts"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::zarplata()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());
    let sink = sink(&server);

    let report = run_crawl(&board, &scraper, &store, &sink, &config, &retry, &moscow_drivers())
        .await
        .unwrap();

    assert!(!board.deliver_without_contacts());
    assert_eq!(report.delivered, 0);
    assert!(store.load_seen().await.unwrap().is_empty());
    assert_eq!(scraper.stats().get_stats().contacts_missing, 1);
}

#[tokio::test]
async fn test_headhunter_delivers_vacancies_without_contacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("disableBrowserCache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_vacancy_page()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vacancy/5/contacts"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = quick_config(&dir);
    let retry = quick_retry();
    let board = HhFamilyBoard::headhunter()
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let scraper = HttpScraper::new().unwrap();
    let store = DiskStorage::new(dir.path(), board.state_stem());
    let sink = sink(&server);

    let report = run_crawl(&board, &scraper, &store, &sink, &config, &retry, &moscow_drivers())
        .await
        .unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(
        store.load_seen().await.unwrap(),
        BTreeSet::from([VacancyId::from(5)])
    );
}
