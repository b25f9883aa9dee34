//! Verify URL resolution and build/parse methods against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use analysis_client::{
    AnalysisClient, ClientError, HttpMethod, HttpRequest, HttpResponse, RequestOptions,
};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    if expected["body"].is_null() {
        assert!(req.body.is_none(), "{name}: body should be None");
    } else {
        let body: serde_json::Value = serde_json::from_slice(req.body_bytes().unwrap()).unwrap();
        assert_eq!(body, expected["body"], "{name}: body");
    }
}

fn assert_rejected(name: &str, err: ClientError, expected: &serde_json::Value) {
    match err {
        ClientError::ServerRejected { status, body } => {
            assert_eq!(status as u64, expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(body, expected["body"].as_str().unwrap(), "{name}: body");
        }
        other => panic!("{name}: expected ServerRejected, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let options: RequestOptions = serde_json::from_value(case["options"].clone()).unwrap();
        let result = options.endpoint_url(case["path"].as_str().unwrap());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Configuration" => assert!(
                    matches!(err, ClientError::Configuration(_)),
                    "{name}: expected Configuration"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let url = result.unwrap();
            assert_eq!(url, case["expected_url"].as_str().unwrap(), "{name}: url");
            // Hosts come back lowercased, as URL hosts are.
            let host = options.host.trim().to_ascii_lowercase();
            let authority = format!("{host}:{}", options.effective_port());
            assert_eq!(url.matches(&authority).count(), 1, "{name}: authority once");
            assert!(!url["https://".len()..].contains("//"), "{name}: double slash");
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[test]
fn operation_test_vectors() {
    let raw = include_str!("../../test-vectors/operations.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let options: RequestOptions = serde_json::from_value(vectors["options"].clone()).unwrap();
    let c = AnalysisClient::new(options);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();

        // Verify build
        let req = match operation {
            "status" => c.build_project_status().unwrap(),
            "delete" => c.build_delete_project().unwrap(),
            other => panic!("{name}: unknown operation: {other}"),
        };
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let response = simulated(case);
        let parsed = match operation {
            "status" => c
                .parse_project_status(response)
                .map(|s| serde_json::to_value(s).unwrap()),
            _ => c
                .parse_delete_project(response)
                .map(|d| serde_json::to_value(d).unwrap()),
        };

        if let Some(expected_error) = case.get("expected_error") {
            assert_rejected(name, parsed.unwrap_err(), expected_error);
        } else {
            assert_eq!(parsed.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
