//! Verify request building and response classification against the JSON
//! test vectors stored in `test-vectors/`.
//!
//! Each build case describes an `ApiRequest` (optionally with caller headers)
//! plus stored token and the wire request it must produce; each classify case
//! describes a response and the outcome it must land in. Bodies are compared as parsed JSON so field order
//! does not matter.

use pretty_assertions::assert_eq;
use portal_core::{
    build_request, classify, ApiRequest, HttpMethod, Payload, ResponseOutcome, WireBody,
};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_payload(value: &serde_json::Value) -> Payload {
    if value == "absent" {
        return Payload::Absent;
    }
    if let Some(json) = value.get("json") {
        return Payload::Json(json.clone());
    }
    if let Some(text) = value.get("text").and_then(|t| t.as_str()) {
        return Payload::Text(text.to_string());
    }
    panic!("unknown payload: {value}");
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected = &case["expected_request"];

        let mut request = ApiRequest::new(
            parse_method(input["method"].as_str().unwrap()),
            input["path"].as_str().unwrap(),
        );
        if input["auth"].as_bool().unwrap() {
            request = request.authenticated();
        }
        if !input["body"].is_null() {
            request = request.json(&input["body"]).unwrap();
        }
        if let Some(headers) = input["headers"].as_array() {
            for pair in headers {
                request = request.header(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
            }
        }

        let built = build_request(base_url, &request, input["token"].as_str()).unwrap();

        assert_eq!(built.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(built.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(built.headers, expected_headers, "{name}: headers");

        match &built.body {
            None => assert!(expected["body"].is_null(), "{name}: body should be present"),
            Some(WireBody::Text(text)) => {
                let body: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
            }
            Some(other) => panic!("{name}: unexpected body {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classify
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = &case["response"];
        let expected = &case["expected"];

        let outcome = classify(
            response["status"].as_u64().unwrap() as u16,
            response["content_type"].as_str(),
            response["body"].as_str().unwrap().as_bytes(),
            case["requires_auth"].as_bool().unwrap(),
        );

        let expected_outcome = match expected["outcome"].as_str().unwrap() {
            "success" => ResponseOutcome::Success(parse_payload(&expected["payload"])),
            "client_error" => ResponseOutcome::ClientError {
                status: expected["status"].as_u64().unwrap() as u16,
                message: expected["message"].as_str().unwrap().to_string(),
            },
            "auth_expired" => ResponseOutcome::AuthExpired {
                status: expected["status"].as_u64().unwrap() as u16,
            },
            other => panic!("{name}: unknown outcome: {other}"),
        };
        assert_eq!(outcome, expected_outcome, "{name}");
    }
}
