//! Strapi client behaviour: headers, error mapping and health checks

mod helpers;

use assert_matches::assert_matches;
use instructor_hub::config::settings::StrapiConfig;
use instructor_hub::models::{EntityRef, Instructor};
use instructor_hub::strapi::Query;
use instructor_hub::utils::errors::StrapiError;
use instructor_hub::{HubError, StrapiClient};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::*;

fn config(server: &MockServer) -> StrapiConfig {
    StrapiConfig {
        base_url: server.uri(),
        api_token: Some("secret-token".to_string()),
        ..StrapiConfig::default()
    }
}

#[tokio::test]
async fn test_requests_carry_token_and_no_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/instructors"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("cache-control", "no-cache"))
        .and(query_param("filters[name][$containsi]", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 3, "documentId": "abc123", "name": "Ada"}],
            "meta": {"pagination": {"page": 1, "pageSize": 100, "pageCount": 1, "total": 1}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StrapiClient::new(&config(&server)).unwrap();
    let query = Query::new().filter("name", instructor_hub::strapi::FilterOp::ContainsI, "ada");
    let found: Vec<Instructor> = client.find("instructors", &query).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].document_id, "abc123");
}

#[tokio::test]
async fn test_server_error_is_recoverable() {
    let ctx = TestContext::new().await;
    ctx.strapi.fail_on("GET", "instructor-groups", 503);

    let result = ctx
        .services
        .group_service
        .get_group(&EntityRef::Numeric(1))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_recoverable());
    assert_matches!(
        err,
        HubError::Strapi(StrapiError::Status { status: 503, ref body }) if body == "Injected failure"
    );
}

#[tokio::test]
async fn test_bad_request_is_not_recoverable() {
    let ctx = TestContext::new().await;
    let user = ctx.strapi.seed_user("mentor", None, None);
    ctx.strapi.fail_on("POST", "instructor-groups", 400);

    let result = ctx
        .services
        .group_service
        .create_group(&EntityRef::Numeric(user.id), "Algebra Mentors")
        .await;

    let err = result.unwrap_err();
    assert!(!err.is_recoverable());
    assert_matches!(err, HubError::Strapi(StrapiError::Status { status: 400, .. }));
}

#[tokio::test]
async fn test_unreachable_server() {
    let client = StrapiClient::new(&StrapiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 1,
        ..StrapiConfig::default()
    })
    .unwrap();

    let result = client.find::<Instructor>("instructors", &Query::new()).await;
    let err = result.unwrap_err();
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;

    let health = ctx.services.health_check().await;
    assert!(health.is_healthy());
    assert!(health.interactions_enabled);
    assert!(health.get_issues().is_empty());
    assert_eq!(ctx.strapi.request_count("GET", "/_health"), 1);
}

#[tokio::test]
async fn test_health_check_reports_unhealthy_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut settings = instructor_hub::Settings::default();
    settings.strapi.base_url = server.uri();
    let services = instructor_hub::ServiceFactory::new(settings).unwrap();

    let health = services.health_check().await;
    assert!(!health.is_healthy());
    assert_eq!(health.get_issues().len(), 1);
}
