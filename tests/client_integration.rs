//! Integration tests for the HTTP client against a wiremock server

use chrono::{TimeZone, Utc};
use core::time::Duration;
use f1db::api::{Endpoint, F1Api, JolpicaClient, PageRequest, Scope};
use f1db::sync::{SyncEngine, SyncOptions};
use f1db::tables::{Catalog, RaceRef, TableStore};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> JolpicaClient {
    JolpicaClient::new(&format!("{}/ergast/f1", server.uri()), Duration::from_secs(10), max_retries).unwrap()
}

fn races_body() -> serde_json::Value {
    json!({
        "MRData": {
            "limit": "100", "offset": "0", "total": "1",
            "RaceTable": {"season": "2024", "Races": [{
                "season": "2024", "round": "1", "url": "https://en.wikipedia.org/wiki/2024_Bahrain_Grand_Prix",
                "raceName": "Bahrain Grand Prix", "date": "2024-03-02",
                "Circuit": {
                    "circuitId": "bahrain", "url": "https://en.wikipedia.org/wiki/Bahrain_International_Circuit",
                    "circuitName": "Bahrain International Circuit",
                    "Location": {"lat": "26.0325", "long": "50.5106", "locality": "Sakhir", "country": "Bahrain"}
                }
            }]}
        }
    })
}

#[tokio::test]
async fn test_page_request_url_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ergast/f1/2024/3/driverstandings.json"))
        .and(query_param("limit", "30"))
        .and(query_param("offset", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"MRData": {"total": "0"}})))
        .expect(1)
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::DriverStandings, Scope::race(RaceRef::new(2024, 3)), 30).at(60);
    let body = client(&server, 0).get_page(&request).await.unwrap();

    assert_eq!(body["MRData"]["total"], "0");
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ergast/f1/2024/races.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ergast/f1/2024/races.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let body = client(&server, 2).get_page(&request).await.unwrap();

    assert_eq!(body["MRData"]["RaceTable"]["Races"][0]["raceName"], "Bahrain Grand Prix");
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()))
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let _ = client(&server, 1).get_page(&request).await.unwrap();
}

#[tokio::test]
async fn test_exhausted_retries_report_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let err = client(&server, 1).get_page(&request).await.unwrap_err();

    assert!(err.to_string().contains("429"), "{err}");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::Races, Scope::season(1949), 100);
    let err = client(&server, 3).get_page(&request).await.unwrap_err();

    assert!(err.to_string().contains("returned status 404"), "{err}");
}

#[tokio::test]
async fn test_slow_response_is_retried_after_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()).set_delay(Duration::from_secs(5)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = JolpicaClient::new(&format!("{}/ergast/f1", server.uri()), Duration::from_millis(300), 1).unwrap();
    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let body = client.get_page(&request).await.unwrap();

    assert_eq!(body["MRData"]["total"], "1");
}

#[tokio::test]
async fn test_slow_response_without_retries_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = JolpicaClient::new(&format!("{}/ergast/f1", server.uri()), Duration::from_millis(300), 0).unwrap();
    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let _ = client.get_page(&request).await.unwrap_err();
}

#[tokio::test]
async fn test_malformed_body_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let request = PageRequest::new(Endpoint::Races, Scope::season(2024), 100);
    let err = client(&server, 0).get_page(&request).await.unwrap_err();

    assert!(err.to_string().contains("unable to parse"), "{err}");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_sync_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ergast/f1/2024/races.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(races_body()))
        .mount(&server)
        .await;

    for endpoint in ["driverstandings", "constructorstandings"] {
        Mock::given(method("GET"))
            .and(path(format!("/ergast/f1/2024/{endpoint}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "MRData": {"limit": "100", "offset": "0", "total": "0",
                           "StandingsTable": {"season": "2024", "StandingsLists": []}}
            })))
            .mount(&server)
            .await;
    }

    let tmp = tempfile::tempdir().unwrap();
    let store = TableStore::new(tmp.path(), Catalog::default());
    let options = SyncOptions {
        page_limit: 100,
        first_season: 2024,
    };
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();

    let mut engine = SyncEngine::new(client(&server, 0), store, options, now).unwrap();
    engine.update().await.unwrap();

    let circuits = std::fs::read_to_string(tmp.path().join("circuits.csv")).unwrap();
    assert_eq!(
        circuits,
        "circuitId,url,circuitName,locationLat,locationLong,locationLocality,locationCountry\n\
         bahrain,https://en.wikipedia.org/wiki/Bahrain_International_Circuit,Bahrain International Circuit,26.0325,50.5106,Sakhir,Bahrain\n"
    );
    assert!(!tmp.path().join("drivers_standings.csv").exists());
}
