//! Integration tests for the Idealista client (wiremock-based)

use std::time::{Duration, Instant};

use domain::BoundingBox;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use integration_idealista::{
    IdealistaApiClient, IdealistaClient, IdealistaConfig, IdealistaError, device_identifier,
};

fn config_for_mock(base_url: &str) -> IdealistaConfig {
    IdealistaConfig {
        oauth_base_url: format!("{base_url}/api/oauth"),
        search_url: format!("{base_url}/api/3.5/es/search"),
        timeout_secs: 5,
        page_size: 20,
        ..IdealistaConfig::default()
    }
}

fn barcelona_box() -> BoundingBox {
    BoundingBox::new(41.38, 2.15, 41.40, 2.18).unwrap()
}

const TOKEN_BODY: &str =
    r#"{"access_token":"tok-123","token_type":"bearer","expires_in":43199,"scope":"write"}"#;

fn element(code: &str, price: f64) -> Value {
    json!({
        "propertyCode": code,
        "propertyType": "flat",
        "url": format!("https://www.idealista.com/inmueble/{code}/"),
        "latitude": 41.39,
        "longitude": 2.16,
        "address": "Carrer de Mallorca",
        "country": "es",
        "province": "Barcelona",
        "municipality": "Barcelona",
        "price": price,
        "operation": "rent",
        "numPhotos": 8,
        "hasVideo": false,
        "rooms": 3,
        "contactInfo": {"userType": "private", "phone1": {"phoneNumber": "600000000"}}
    })
}

fn sample_search_json() -> Value {
    json!({
        "actualPage": 1,
        "itemsPerPage": 20,
        "total": 2,
        "totalPages": 1,
        "upperRangePosition": 2,
        "elementList": [element("90001", 1200.0), element("90002", 980.0)]
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn header_str<'a>(request: &'a Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

fn query_value(request: &Request, name: &str) -> String {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

async fn authorized_client(server: &MockServer) -> IdealistaApiClient {
    mount_token(server).await;
    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    client.authorize().await.unwrap();
    client
}

#[tokio::test]
async fn test_authorize_sends_client_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(header(
            "authorization",
            "Basic NWI4NWMwM2MxNmJiYjg1ZDk2ZTIzMmIxMTJlZTg1ZGM6aWRlYSUzQmFuZHIwMWQ=",
        ))
        .and(header("app_version", "7.3.7"))
        .and(header("country", "es"))
        .and(header_exists("device_identifier"))
        .and(header_exists("user-agent"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=write"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    let raw = client.authorize().await.unwrap();

    assert_eq!(raw, TOKEN_BODY);
    assert!(client.session().is_authenticated());

    let requests = server.received_requests().await.unwrap();
    let device = header_str(&requests[0], "device_identifier");
    assert_eq!(device.len(), 16);
    assert!(device.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_authorize_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"unauthorized"}"#))
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client.authorize().await.unwrap_err();

    assert!(matches!(err, IdealistaError::AuthError(_)));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_authorize_without_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"token_type":"bearer"}"#))
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client.authorize().await.unwrap_err();
    assert!(err.requires_authorization());
}

#[tokio::test]
async fn test_failed_reauthorization_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    client.authorize().await.unwrap();
    assert!(client.authorize().await.is_err());

    let err = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, IdealistaError::NotAuthorized));
}

#[tokio::test]
async fn test_search_requires_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_json()))
        .expect(0)
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client
        .search_by_location("Madrid", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, IdealistaError::NotAuthorized));
}

#[tokio::test]
async fn test_bounding_box_search_success() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .and(header("authorization", "Bearer tok-123"))
        .and(query_param("numPage", "1"))
        .and(query_param("k", "5b85c03c16bbb85d96e232b112ee85dc"))
        .and(body_string_contains("shape="))
        .and(body_string_contains("MultiPolygon"))
        .and(body_string_contains("propertyType=homes"))
        .and(body_string_contains("operation=rent"))
        .and(body_string_contains("maxItems=20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_json()))
        .expect(1)
        .mount(&server)
        .await;

    let batch = client
        .search_by_bounding_box(&barcelona_box(), 0)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.total, Some(2));
    assert_eq!(batch.total_pages, Some(1));
    assert_eq!(batch.records[0].property_code().as_deref(), Some("90001"));
    assert_eq!(batch.records[1].price(), Some(980.0));
    assert_eq!(batch.records[0].fields().str("municipality"), Some("Barcelona"));
    let contact = batch.records[0].contact_info.as_ref().unwrap();
    assert_eq!(contact.user_type(), Some("private"));
    assert!(client.last_request_time().is_some());
}

#[tokio::test]
async fn test_every_call_carries_the_authorizing_terminal() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;
    mount_search(&server, sample_search_json()).await;

    client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap()
        .unwrap();
    client.search_by_location("Madrid", 2).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let (token_request, searches) = requests.split_first().unwrap();

    for search in searches {
        assert_eq!(header_str(search, "authorization"), "Bearer tok-123");
        for name in ["device_identifier", "user-agent", "app_version"] {
            assert_eq!(header_str(search, name), header_str(token_request, name));
        }
        let t = query_value(search, "t");
        assert_eq!(device_identifier(&t), header_str(search, "device_identifier"));
    }
    assert_eq!(query_value(&searches[1], "numPage"), "2");
}

#[tokio::test]
async fn test_location_search_has_no_shape() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;
    mount_search(&server, sample_search_json()).await;

    client.search_by_location("Madrid", 1).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[1].body.clone()).unwrap();
    assert!(body.contains("locationName=Madrid"));
    assert!(body.contains("order=distance"));
    assert!(body.contains("distance=2000"));
    assert!(!body.contains("shape="));
}

#[tokio::test]
async fn test_loaded_token_is_used() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .and(header("authorization", "Bearer cached-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    client
        .load_token(r#"{"access_token":"cached-token"}"#)
        .await
        .unwrap();

    let batch = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap();
    assert!(batch.is_some());
}

#[tokio::test]
async fn test_server_error_returns_none() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_non_json_body_returns_none() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/3.5/es/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let result = client.search_by_location("Madrid", 1).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_missing_total_pages_is_an_error() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;
    mount_search(&server, json!({"total": 0, "elementList": []})).await;

    let err = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap_err();
    assert_eq!(err.missing_field(), Some("totalPages"));
}

#[tokio::test]
async fn test_element_missing_required_field() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;

    let mut broken = element("90003", 700.0);
    broken.as_object_mut().unwrap().remove("price");
    mount_search(
        &server,
        json!({"totalPages": 1, "elementList": [element("90001", 1200.0), broken]}),
    )
    .await;

    let err = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap_err();
    assert_eq!(err.missing_field(), Some("price"));
}

#[tokio::test]
async fn test_empty_result_is_not_absent() {
    let server = MockServer::start().await;
    let client = authorized_client(&server).await;
    mount_search(&server, json!({"totalPages": 0, "total": 0, "elementList": []})).await;

    let batch = client
        .search_by_bounding_box(&barcelona_box(), 1)
        .await
        .unwrap()
        .unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.total, Some(0));
}

const TOKEN_PATH: &str = "/api/oauth/token";
const SEARCH_PATH: &str = "/api/3.5/es/search";

fn requests_to(requests: &[Request], endpoint: &str) -> Vec<Request> {
    requests
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_concurrent_authorizations_are_serialized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TOKEN_BODY)
                .set_delay(Duration::from_millis(100)),
        )
        .expect(4)
        .mount(&server)
        .await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    let start = Instant::now();
    let (a, b, c, d) = tokio::join!(
        client.authorize(),
        client.authorize(),
        client.authorize(),
        client.authorize()
    );
    for result in [a, b, c, d] {
        assert_eq!(result.unwrap(), TOKEN_BODY);
    }
    assert!(start.elapsed() >= Duration::from_millis(400));

    let credentials = client.session().credentials().unwrap();
    let terminal = &credentials.terminal;
    assert_eq!(terminal.device_identifier(), device_identifier(terminal.t()));

    let requests = server.received_requests().await.unwrap();
    let exchange = requests_to(&requests, TOKEN_PATH)
        .into_iter()
        .find(|r| header_str(r, "device_identifier") == terminal.device_identifier())
        .unwrap();
    assert_eq!(header_str(&exchange, "user-agent"), terminal.user_agent());
    assert_eq!(header_str(&exchange, "app_version"), terminal.app_version());
}

#[tokio::test]
async fn test_search_during_reauthorization_sends_one_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TOKEN_BODY)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_search(&server, sample_search_json()).await;

    let client = IdealistaApiClient::new(&config_for_mock(&server.uri())).unwrap();
    client
        .load_token(r#"{"access_token":"cached"}"#)
        .await
        .unwrap();
    let before = client.session().credentials().unwrap();

    let bbox = barcelona_box();
    let (authorized, during) = tokio::join!(
        client.authorize(),
        client.search_by_bounding_box(&bbox, 1)
    );
    authorized.unwrap();
    assert_eq!(during.unwrap().unwrap().len(), 2);
    let after = client.session().credentials().unwrap();
    assert_ne!(before.terminal, after.terminal);

    client
        .search_by_bounding_box(&barcelona_box(), 2)
        .await
        .unwrap()
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let searches = requests_to(&requests, SEARCH_PATH);
    assert_eq!(searches.len(), 2);

    for (search, credentials, bearer) in [
        (&searches[0], &before, "Bearer cached"),
        (&searches[1], &after, "Bearer tok-123"),
    ] {
        let t = query_value(search, "t");
        assert_eq!(t, credentials.terminal.t());
        assert_eq!(header_str(search, "device_identifier"), device_identifier(&t));
        assert_eq!(header_str(search, "user-agent"), credentials.terminal.user_agent());
        assert_eq!(header_str(search, "app_version"), credentials.terminal.app_version());
        assert_eq!(header_str(search, "authorization"), bearer);
    }

    let exchange = &requests_to(&requests, TOKEN_PATH)[0];
    assert_eq!(
        header_str(exchange, "device_identifier"),
        after.terminal.device_identifier()
    );
}
