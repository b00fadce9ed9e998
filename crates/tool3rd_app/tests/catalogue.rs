use pretty_assertions::assert_eq;
use tool3rd_app::{CatalogueError, CatalogueSource, HttpCatalogue};
use tool3rd_core::{CatalogueSeries, CatalogueSpec};
use tool3rd_protocol::Settings;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"[
  {"name": "38_series", "children": [
    {"name": "38.331", "children": ["38.331-h00.asn1", "38.331-h10.asn1"]}
  ]}
]"#;

#[tokio::test]
async fn listing_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.dir-list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LISTING, "application/json"))
        .mount(&server)
        .await;

    let catalogue = HttpCatalogue::new(&server.uri(), &Settings::default()).unwrap();
    assert_eq!(
        catalogue.listing().await.unwrap(),
        vec![CatalogueSeries {
            name: "38_series".to_string(),
            children: vec![CatalogueSpec {
                name: "38.331".to_string(),
                children: vec!["38.331-h00.asn1".to_string(), "38.331-h10.asn1".to_string()],
            }],
        }]
    );
}

#[tokio::test]
async fn resource_is_fetched_below_series_and_spec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specs/38_series/38.331/38.331-h00.asn1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"modulesTag": 1}"#))
        .mount(&server)
        .await;

    let base = format!("{}/specs", server.uri());
    let catalogue = HttpCatalogue::new(&base, &Settings::default()).unwrap();
    let body = catalogue
        .resource("38_series", "38.331", "38.331-h00.asn1")
        .await
        .unwrap();
    assert_eq!(body, r#"{"modulesTag": 1}"#);
}

#[tokio::test]
async fn http_errors_become_download_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let catalogue = HttpCatalogue::new(&server.uri(), &Settings::default()).unwrap();
    let err = catalogue.resource("a", "b", "c").await.unwrap_err();
    assert!(matches!(err, CatalogueError::HttpStatus(404)));
    let (title, description) = err.notification();
    assert_eq!(title, "Download failed");
    assert!(description.contains("manually"));
}

#[tokio::test]
async fn invalid_listing_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.dir-list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let catalogue = HttpCatalogue::new(&server.uri(), &Settings::default()).unwrap();
    assert!(matches!(
        catalogue.listing().await.unwrap_err(),
        CatalogueError::Listing(_)
    ));
}

#[test]
fn missing_certificate_file_is_a_configuration_error() {
    let mut settings = Settings::default();
    settings.certificate.enabled = true;
    settings.certificate.path = "/definitely/not/here.pem".to_string();

    let err = HttpCatalogue::new("https://example.com/", &settings).unwrap_err();
    assert!(matches!(err, CatalogueError::Certificate { .. }));
    assert_eq!(err.notification().0, "Certificate error");
}

#[test]
fn connection_reset_points_to_proxy_settings() {
    let (title, description) = CatalogueError::ConnectionReset("reset".to_string()).notification();
    assert_eq!(title, "Connection reset");
    assert!(description.contains("proxy"));
}

#[test]
fn resource_urls_escape_path_segments() {
    let catalogue = HttpCatalogue::new("https://cdn.example.com/base", &Settings::default()).unwrap();
    assert_eq!(
        catalogue.listing_url().unwrap().as_str(),
        "https://cdn.example.com/base/.dir-list.json"
    );
    assert_eq!(
        catalogue
            .resource_url("38 series", "38.331", "v1.asn1")
            .unwrap()
            .as_str(),
        "https://cdn.example.com/base/38%20series/38.331/v1.asn1"
    );
}
