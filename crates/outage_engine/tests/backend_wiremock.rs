use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outage_engine::{Backend, FetchError, FetchSettings, PortalBackend, TableQuery};

mod common;
use common::test_config;

fn backend_for(server: &MockServer) -> PortalBackend {
    let settings = FetchSettings {
        base_url: format!("{}/", server.uri()),
        ..FetchSettings::default()
    };
    PortalBackend::new(settings).unwrap()
}

#[tokio::test]
async fn table_page_sends_the_datatables_body_and_decodes_the_slice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getDataTableData/"))
        .and(query_param("viewType", "TABLE"))
        .and(query_param("border.values", "ALL"))
        .and(body_partial_json(json!({
            "iDisplayStart": 100,
            "iDisplayLength": 100,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aaData": [["A05", "A53", "interval", "DE", "FR", "1000", "id-1"]],
            "iTotalRecords": 137,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let query = TableQuery::build(&test_config(), None);
    let page = backend.table_page(&query, 100).await.unwrap();

    assert_eq!(page.total, 137);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0][6], "id-1");
}

#[tokio::test]
async fn validation_rejection_surfaces_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getDataTableData/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "dateTime is required"}],
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let query = TableQuery::build(&test_config(), None);
    let err = backend.table_page(&query, 0).await.unwrap_err();

    assert_eq!(err, FetchError::BadParams("dateTime is required".to_string()));
}

#[tokio::test]
async fn unparseable_error_bodies_fall_back_to_the_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getDataTableData/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let query = TableQuery::build(&test_config(), None);
    let err = backend.table_page(&query, 0).await.unwrap_err();

    assert_eq!(err, FetchError::Status(502));
}

#[tokio::test]
async fn detail_document_is_fetched_as_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detail"))
        .and(query_param("detailId", "id-9"))
        .and(query_param("fullDetailId", "id-9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<table><tr><td>ok</td></tr></table>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let doc = backend.detail_document("id-9").await.unwrap();

    assert!(doc.contains("<td>ok</td>"));
}

#[tokio::test]
async fn series_page_posts_the_curve_body_for_one_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getDetailCurve/"))
        .and(query_param("detailId", "id-9"))
        .and(body_partial_json(json!({
            "sColumns": "mtu,ntc",
            "iDisplayStart": 48,
            "iDisplayLength": 100,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aaData": [["01.01.2021 00:00", "950"]],
            "iTotalRecords": 240,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let page = backend.series_page("id-9", 48, 100).await.unwrap();

    assert_eq!(page.total, 240);
    assert_eq!(
        page.rows,
        vec![("01.01.2021 00:00".to_string(), "950".to_string())]
    );
}

#[tokio::test]
async fn border_values_come_from_the_scraped_filter_page() {
    let server = MockServer::start().await;
    // One wrapper block per country, in portal order (AL first, then AT).
    let html = r#"
        <html><body>
          <div class="dv-sub-filter-hierarchic-wrapper">
            <input type="checkbox" value="on">
            <input type="checkbox" value="CTY|10YAL-KESH-----5!BZN">
          </div>
          <div class="dv-sub-filter-hierarchic-wrapper">
            <input type="checkbox" value="CTY|10YAT-APG------L!BZN">
          </div>
        </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/show"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let borders = backend.border_values("AT").await.unwrap();

    assert_eq!(borders, vec!["CTY|10YAT-APG------L!BZN".to_string()]);
}

#[tokio::test]
async fn unknown_country_in_the_border_map_is_a_parameter_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/show"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.border_values("AT").await.unwrap_err();

    assert!(matches!(err, FetchError::BadParams(_)));
}

#[tokio::test]
async fn connection_failures_are_transport_errors() {
    // Nothing is listening once the server is dropped. A bare (non-pooled)
    // server is required: pooled servers keep their listener alive after drop.
    let uri = {
        let server = MockServer::builder().start().await;
        server.uri()
    };

    let settings = FetchSettings {
        base_url: format!("{uri}/"),
        ..FetchSettings::default()
    };
    let backend = PortalBackend::new(settings).unwrap();
    let err = backend.detail_document("id-1").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
}
