//! Integration tests for tenant resolution using wiremock.
//!
//! These tests mock the platform API to verify the resolver's priority
//! chain, slug caching, and request coalescing.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use kiosk_core::{StoreSlug, TenantRef};
use kiosk_tenancy::{
    RequestContext, SessionContext, SessionProfile, TenancyError, TenantResolver, TenantSource,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forge_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

fn profile_for(store_id: &str) -> SessionProfile {
    SessionProfile {
        store_id: Some(TenantRef::Id(store_id.to_owned())),
        ..SessionProfile::default()
    }
}

fn store_check_body(id: &str) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": { "store": { "_id": id, "slug": "acme", "status": "active" } }
    })
}

#[tokio::test]
async fn test_navigation_slug_beats_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous().with_profile(profile_for("t_999"));
    let nav = RequestContext::for_path("/manager/acme/products");

    let id = resolver.resolve(&ctx, &nav).await.unwrap();
    assert_eq!(id.as_str(), "t_123");
}

#[tokio::test]
async fn test_slug_mapping_is_cached_after_first_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous();
    let nav = RequestContext::for_path("/manager/acme/products");

    let first = resolver.resolve(&ctx, &nav).await.unwrap();
    let second = resolver.resolve(&ctx, &nav).await.unwrap();
    assert_eq!(first, second);
    // expect(1) is verified when mock_server drops.
}

#[tokio::test]
async fn test_host_label_slug_is_same_cache_key_as_path_slug() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous();

    let via_path = resolver
        .resolve(&ctx, &RequestContext::for_path("/manager/acme/orders"))
        .await
        .unwrap();
    let via_host = resolver
        .resolve(&ctx, &RequestContext::for_host("acme--admin.example.com"))
        .await
        .unwrap();
    assert_eq!(via_path, via_host);
}

#[tokio::test]
async fn test_store_check_failure_falls_through_to_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous().with_profile(profile_for("t_fallback"));
    let nav = RequestContext::for_path("/manager/acme/products");

    let id = resolver.resolve(&ctx, &nav).await.unwrap();
    assert_eq!(id.as_str(), "t_fallback");
}

#[tokio::test]
async fn test_store_check_failure_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(500).set_body_string("transient"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous().with_profile(profile_for("t_fallback"));
    let nav = RequestContext::for_path("/manager/acme/products");

    resolver.resolve(&ctx, &nav).await.unwrap();

    // The failure must not stick: once the platform recovers, the same slug
    // resolves from the platform again.
    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = resolver.resolve(&SessionContext::anonymous(), &nav).await.unwrap();
    assert_eq!(id.as_str(), "t_123");
}

#[tokio::test]
async fn test_unknown_slug_falls_through_to_claims() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "message": "Store not found"
        })))
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let token = forge_token(&serde_json::json!({"storeId": "t_claims"}));
    let ctx = SessionContext::anonymous().with_credential(token);
    let nav = RequestContext::for_path("/manager/ghost/products");

    let id = resolver.resolve(&ctx, &nav).await.unwrap();
    assert_eq!(id.as_str(), "t_claims");
}

#[tokio::test]
async fn test_profile_beats_claims_and_overrides() {
    let token = forge_token(&serde_json::json!({"storeId": "t_claims"}));
    let mut ctx = SessionContext::anonymous()
        .with_profile(profile_for("t_profile"))
        .with_credential(token);
    ctx.overrides.set_persistent("store_id", "t_override");

    let resolver = TenantResolver::new("http://127.0.0.1:1/api/v1");
    let id = resolver
        .resolve(&ctx, &RequestContext::detached())
        .await
        .unwrap();
    assert_eq!(id.as_str(), "t_profile");
}

#[tokio::test]
async fn test_claims_beat_overrides() {
    let token = forge_token(&serde_json::json!({"stores": [{"storeId": "t_claims"}]}));
    let mut ctx = SessionContext::anonymous().with_credential(token);
    ctx.overrides.set_persistent("store_id", "t_override");

    let resolver = TenantResolver::new("http://127.0.0.1:1/api/v1");
    let id = resolver
        .resolve(&ctx, &RequestContext::detached())
        .await
        .unwrap();
    assert_eq!(id.as_str(), "t_claims");
}

#[tokio::test]
async fn test_single_flight_coalesces_concurrent_cold_lookups() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(store_check_body("t_123"))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let ctx = SessionContext::anonymous();
    let nav = RequestContext::for_path("/manager/acme/products");

    let (a, b, c, d) = tokio::join!(
        resolver.resolve(&ctx, &nav),
        resolver.resolve(&ctx, &nav),
        resolver.resolve(&ctx, &nav),
        resolver.resolve(&ctx, &nav),
    );

    for result in [a, b, c, d] {
        assert_eq!(result.unwrap().as_str(), "t_123");
    }
    // expect(1): the four concurrent resolutions shared one platform call.
}

#[tokio::test]
async fn test_invalidate_slug_forces_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let slug = StoreSlug::parse("acme").unwrap();

    resolver.lookup_slug(&slug).await.unwrap();
    resolver.invalidate_slug(&slug).await;
    resolver.lookup_slug(&slug).await.unwrap();
}

#[tokio::test]
async fn test_lookup_slug_reports_definite_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such store"))
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let slug = StoreSlug::parse("ghost").unwrap();

    let err = resolver.lookup_slug(&slug).await.unwrap_err();
    assert!(matches!(err, TenancyError::SlugNotFound(s) if s.as_str() == "ghost"));
}

#[tokio::test]
async fn test_survey_evaluates_every_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/store-check/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_check_body("t_123")))
        .mount(&mock_server)
        .await;

    let resolver = TenantResolver::new(mock_server.uri());
    let mut ctx = SessionContext::anonymous().with_profile(profile_for("t_profile"));
    ctx.overrides.set_session("merchant.store_id", "t_override");
    let nav = RequestContext::for_path("/manager/acme/products");

    let (chosen, report) = resolver.survey(&ctx, &nav).await;

    // Priority pick is the slug, but the report still shows the rest.
    assert_eq!(chosen.unwrap().as_str(), "t_123");
    let sources: Vec<TenantSource> = report.outcomes.iter().map(|o| o.source).collect();
    assert_eq!(
        sources,
        vec![
            TenantSource::Slug,
            TenantSource::Profile,
            TenantSource::Claims,
            TenantSource::Override,
        ]
    );
    assert!(report.to_string().contains("t_override"));
}
