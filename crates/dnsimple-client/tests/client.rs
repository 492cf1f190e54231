use dnsimple_client::{ApiError, Client, SecondaryZoneRequest, ZoneApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn create_secondary_zone_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/1010/secondary_dns/zones"))
        .and(header("authorization", "Bearer t0ken"))
        .and(body_json(json!({"name": "example.bio"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"id": 42, "name": "example.bio", "secondary": true}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let c = Client::new("t0ken", &server.uri(), None).unwrap();
    let zone = c
        .create_secondary_zone(
            "1010",
            &SecondaryZoneRequest {
                name: "example.bio".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(zone.zone.id, 42);
    assert_eq!(zone.zone.name, "example.bio");
}

#[tokio::test]
async fn create_secondary_zone_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/1010/secondary_dns/zones"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": {"name": ["is invalid"]}
        })))
        .mount(&server)
        .await;

    let c = Client::new("t0ken", &server.uri(), None).unwrap();
    let err = c
        .create_secondary_zone("1010", &SecondaryZoneRequest { name: "-".into() })
        .await
        .unwrap_err();
    match err {
        ApiError::Validation {
            status, failures, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].field, "name");
            assert_eq!(failures[0].messages, vec!["is invalid".to_owned()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_zone_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/1010/zones/missing.com"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Zone `missing.com` not found"})),
        )
        .mount(&server)
        .await;

    let c = Client::new("t0ken", &server.uri(), None).unwrap();
    let err = c.get_zone("1010", "missing.com").await.unwrap_err();
    assert!(matches!(err, ApiError::Generic { status: 404, .. }));
}

#[tokio::test]
async fn get_zone_escapes_name_into_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/2020/zones/victim.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 9, "name": "victim.com"}})),
        )
        .expect(0)
        .mount(&server)
        .await;

    let c = Client::new("t0ken", &server.uri(), None).unwrap();
    let err = c
        .get_zone("1010", "../../2020/zones/victim.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Generic { status: 404, .. }));

    let reqs = server.received_requests().await.unwrap();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].url.path(), "/v2/1010/zones/..%2F..%2F2020%2Fzones%2Fvictim.com");
    assert_eq!(reqs[0].url.query(), None);
}

#[tokio::test]
async fn get_zone_refuses_dot_segments() {
    let server = MockServer::start().await;
    let c = Client::new("t0ken", &server.uri(), None).unwrap();
    for name in ["..", ".", ""] {
        let err = c.get_zone("1010", name).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidPath(_)), "{name:?}: {err:?}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn user_agent_includes_extra() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/1010/zones/example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1, "name": "example.com"}})),
        )
        .mount(&server)
        .await;

    let c = Client::new("t0ken", &server.uri(), Some("terraform/1.9")).unwrap();
    c.get_zone("1010", "example.com").await.unwrap();

    let reqs = server.received_requests().await.unwrap();
    let ua = reqs[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(ua.starts_with("tf-dnsimple/"));
    assert!(ua.ends_with(" terraform/1.9"));
}
