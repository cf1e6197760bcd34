//! Integration tests for `LookupProxy` using wiremock HTTP mocks.

use std::time::Duration;

use geoexplorer_core::UpstreamSettings;
use geoexplorer_upstream::{FailureReason, LookupError, LookupProxy};
use serde_json::json;
use tokio::io::AsyncReadExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RPC_PATH: &str = "/rest/v1/rpc/of_emssanar";

fn settings(base_url: &str, timeout_ms: u64) -> UpstreamSettings {
    UpstreamSettings {
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        rpc_path: RPC_PATH.to_string(),
        code_key: "id_dane".to_string(),
        timeout: Duration::from_millis(timeout_ms),
    }
}

fn test_proxy(base_url: &str) -> LookupProxy {
    LookupProxy::new(Some(&settings(base_url, 5000)), true)
        .expect("proxy construction should not fail")
}

fn pasto_envelope() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "municipio": "Pasto",
            "departamento": "Nariño",
            "direccion": "Cra 42",
            "horario_atencion": "",
            "servicios_sub": "",
            "servicios_cont": ""
        }
    })
}

#[tokio::test]
async fn envelope_response_returns_detail_with_default_hours() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header("apikey", "test-key"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({ "id_dane": "52001" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let detail = test_proxy(&server.uri())
        .lookup("52001")
        .await
        .expect("lookup should succeed");

    assert_eq!(detail.municipality, "Pasto");
    assert_eq!(detail.department, "Nariño");
    assert_eq!(detail.address, "Cra 42");
    assert_eq!(detail.hours, "");
}

#[tokio::test]
async fn empty_required_field_is_incomplete_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "municipio": "", "departamento": "Nariño", "direccion": "Cra 42" }
        })))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52001").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::IncompleteData {
            missing: vec!["municipio"]
        }
    );
    assert_eq!(err.reason(), FailureReason::IncompleteUpstreamData);
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn bare_array_with_named_fields_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "nombre_municipio": "Pasto",
            "nombre_departamento": "Nariño",
            "direccion": "Cra 42",
            "horario": "7-3"
        }])))
        .mount(&server)
        .await;

    let detail = test_proxy(&server.uri()).lookup("52001").await.unwrap();
    assert_eq!(detail.municipality, "Pasto");
    assert_eq!(detail.hours, "7-3");
    assert_eq!(detail.subsidized_services, "");
}

#[tokio::test]
async fn empty_bare_array_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52001").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::NotFound);
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn envelope_failure_carries_upstream_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "No se encontró el municipio"
        })))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("99999").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::NotFound("No se encontró el municipio".to_string())
    );
    assert_eq!(err.public_message(), "No se encontró el municipio");
}

#[tokio::test]
async fn no_content_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52001").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::NotFound);
}

#[tokio::test]
async fn non_success_status_is_upstream_error_with_propagated_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52001").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::Upstream {
            status: 503,
            status_text: "Service Unavailable".to_string()
        }
    );
    assert_eq!(err.status_code(), 503);
    assert_eq!(
        err.public_message(),
        "Error from upstream: Service Unavailable"
    );
}

#[tokio::test]
async fn invalid_json_body_is_internal_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52001").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::InternalError);
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "Internal server error");
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pasto_envelope())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let proxy = LookupProxy::new(Some(&settings(&server.uri(), 100)), true).unwrap();
    let started = std::time::Instant::now();
    let err = proxy.lookup("52001").await.unwrap_err();

    assert_eq!(err, LookupError::Timeout { timeout_ms: 100 });
    assert_eq!(err.status_code(), 504);
    assert_eq!(err.public_message(), "Request timeout");
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "lookup should return at the bound, not when the upstream answers"
    );
}

#[tokio::test]
async fn timed_out_lookup_closes_the_upstream_connection() {
    // Raw listener that never answers, so the connection lifetime is observable.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await
        .is_ok();
        let _ = closed_tx.send(closed);
    });

    let proxy = LookupProxy::new(Some(&settings(&format!("http://{addr}"), 200)), true).unwrap();
    let err = proxy.lookup("52001").await.unwrap_err();
    assert_eq!(err, LookupError::Timeout { timeout_ms: 200 });

    let closed = closed_rx.await.expect("listener task reports");
    assert!(closed, "upstream connection should be closed once the lookup times out");
}

#[tokio::test]
async fn blank_code_never_reaches_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(0)
        .mount(&server)
        .await;

    let proxy = test_proxy(&server.uri());
    for code in ["", "   "] {
        let err = proxy.lookup(code).await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidInput);
        assert_eq!(err.public_message(), "ID is required");
    }
}

#[tokio::test]
async fn non_numeric_code_is_rejected_in_strict_mode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup("52O01").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::InvalidInput("Invalid ID format. Only numbers are allowed".to_string())
    );
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn padded_code_is_rejected_in_strict_mode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_proxy(&server.uri()).lookup(" 52001 ").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::InvalidInput("Invalid ID format. Only numbers are allowed".to_string())
    );
}

#[tokio::test]
async fn lenient_mode_forwards_non_numeric_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "id_dane": "CO-52001" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let proxy = LookupProxy::new(Some(&settings(&server.uri(), 5000)), false).unwrap();
    assert!(proxy.lookup("CO-52001").await.is_ok());
}

#[tokio::test]
async fn configured_code_key_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_location_info"))
        .and(body_json(json!({ "p_id_dane": "52001" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let mut s = settings(&server.uri(), 5000);
    s.rpc_path = "/rest/v1/rpc/get_location_info".to_string();
    s.code_key = "p_id_dane".to_string();
    let proxy = LookupProxy::new(Some(&s), true).unwrap();

    assert!(proxy.lookup("52001").await.is_ok());
}

#[tokio::test]
async fn repeated_lookups_are_identical() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .expect(2)
        .mount(&server)
        .await;

    let proxy = test_proxy(&server.uri());
    let first = proxy.lookup("52001").await;
    let second = proxy.lookup("52001").await;
    assert!(first.is_ok());
    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_lookups_time_out_independently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "id_dane": "11001" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pasto_envelope())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "id_dane": "52001" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pasto_envelope()))
        .mount(&server)
        .await;

    let proxy = LookupProxy::new(Some(&settings(&server.uri(), 300)), true).unwrap();
    let (slow, fast) = tokio::join!(proxy.lookup("11001"), proxy.lookup("52001"));

    assert_eq!(slow, Err(LookupError::Timeout { timeout_ms: 300 }));
    assert_eq!(fast.expect("fast lookup unaffected").municipality, "Pasto");
}

#[tokio::test]
async fn unreachable_upstream_is_internal_error() {
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let proxy = LookupProxy::new(Some(&settings("http://127.0.0.1:9", 2000)), true).unwrap();
    let err = proxy.lookup("52001").await.unwrap_err();
    assert!(
        matches!(
            err.reason(),
            FailureReason::InternalError | FailureReason::Timeout
        ),
        "unexpected reason: {err:?}"
    );
}
