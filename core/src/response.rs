//! Response decoding and classification.
//!
//! # Design
//! Classification is a pure function of the response and the request's
//! `requires_auth` flag. It never fails: a body that cannot be decoded is
//! `Payload::Absent`, and every status lands in exactly one `ResponseOutcome`.
//! Side effects for an expired session (dropping the token, navigating) live
//! in `ApiClient`, not here.

use serde_json::Value;

/// Statuses the backend uses to signal an expired or missing session.
/// 419 is the CSRF/session-timeout status some PHP frameworks emit.
pub const AUTH_EXPIRED_STATUSES: [u16; 2] = [401, 419];

const UNAUTHENTICATED_MARKER: &str = "unauthenticated";

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Absent,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Payload::Absent)
    }

    /// The `message` field of a JSON object payload, if it is a string.
    pub fn message(&self) -> Option<&str> {
        self.as_json()?.get("message")?.as_str()
    }

    /// Collapse into a JSON value: text becomes a JSON string, absent becomes null.
    pub fn into_value(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
            Payload::Absent => Value::Null,
        }
    }
}

/// Terminal state of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Success(Payload),
    ClientError { status: u16, message: String },
    AuthExpired { status: u16 },
}

/// Whether a `content-type` value declares JSON (`application/json`, or any
/// `+json` structured suffix), ignoring parameters such as `charset`.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Decode a body according to its declared content type.
pub fn decode_payload(content_type: Option<&str>, body: &[u8]) -> Payload {
    if content_type.is_some_and(is_json_content_type) {
        return serde_json::from_slice(body)
            .map(Payload::Json)
            .unwrap_or(Payload::Absent);
    }
    decode_text(body)
}

fn decode_text(body: &[u8]) -> Payload {
    std::str::from_utf8(body)
        .map(|text| Payload::Text(text.to_string()))
        .unwrap_or(Payload::Absent)
}

/// Whether a failed response means the session is gone.
pub fn is_auth_expiry(status: u16, payload: &Payload, requires_auth: bool) -> bool {
    if !requires_auth {
        return false;
    }
    AUTH_EXPIRED_STATUSES.contains(&status)
        || payload
            .message()
            .is_some_and(|m| m.to_lowercase().contains(UNAUTHENTICATED_MARKER))
}

/// Pick the user-facing message for a failed response.
pub fn error_message(status: u16, payload: &Payload) -> String {
    if let Some(message) = payload.message().filter(|m| !m.is_empty()) {
        return message.to_string();
    }
    match payload {
        Payload::Text(text) if !text.trim().is_empty() => text.clone(),
        Payload::Json(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        _ => format!("Request failed with status {status}"),
    }
}

/// Classify a response into its terminal outcome.
pub fn classify(status: u16, content_type: Option<&str>, body: &[u8], requires_auth: bool) -> ResponseOutcome {
    if (200..300).contains(&status) {
        return ResponseOutcome::Success(decode_payload(content_type, body));
    }

    let payload = decode_payload(content_type, body);
    if is_auth_expiry(status, &payload, requires_auth) {
        return ResponseOutcome::AuthExpired { status };
    }

    ResponseOutcome::ClientError {
        status,
        message: error_message(status, &payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("text/plain; note=application/json"));
    }

    #[test]
    fn success_decodes_json() {
        let outcome = classify(200, JSON, br#"{"access_token":"abc"}"#, false);
        assert_eq!(
            outcome,
            ResponseOutcome::Success(Payload::Json(json!({"access_token": "abc"})))
        );
    }

    #[test]
    fn success_without_json_type_is_text() {
        let outcome = classify(200, Some("text/plain"), b"pong", true);
        assert_eq!(outcome, ResponseOutcome::Success(Payload::Text("pong".into())));
    }

    #[test]
    fn broken_json_becomes_absent() {
        assert_eq!(classify(200, JSON, b"{nope", false), ResponseOutcome::Success(Payload::Absent));
        assert_eq!(classify(204, JSON, b"", false), ResponseOutcome::Success(Payload::Absent));
    }

    #[test]
    fn invalid_utf8_text_becomes_absent() {
        assert_eq!(decode_payload(None, &[0xff, 0xfe]), Payload::Absent);
    }

    #[test]
    fn auth_statuses_expire_only_authenticated_requests() {
        for status in AUTH_EXPIRED_STATUSES {
            assert_eq!(
                classify(status, JSON, br#"{"message":"nope"}"#, true),
                ResponseOutcome::AuthExpired { status }
            );
            assert_eq!(
                classify(status, JSON, br#"{"message":"nope"}"#, false),
                ResponseOutcome::ClientError { status, message: "nope".into() }
            );
        }
    }

    #[test]
    fn unauthenticated_message_expires_any_status() {
        let outcome = classify(403, JSON, br#"{"message":"Unauthenticated."}"#, true);
        assert_eq!(outcome, ResponseOutcome::AuthExpired { status: 403 });
    }

    #[test]
    fn message_priority() {
        assert_eq!(
            classify(422, JSON, br#"{"message":"password confirmation does not match"}"#, false),
            ResponseOutcome::ClientError {
                status: 422,
                message: "password confirmation does not match".into()
            }
        );
        assert_eq!(
            classify(500, Some("text/plain"), b"database down", false),
            ResponseOutcome::ClientError { status: 500, message: "database down".into() }
        );
        assert_eq!(
            classify(502, Some("text/html"), b"", false),
            ResponseOutcome::ClientError {
                status: 502,
                message: "Request failed with status 502".into()
            }
        );
        assert_eq!(
            classify(400, JSON, br#"{"message":""}"#, false),
            ResponseOutcome::ClientError {
                status: 400,
                message: "Request failed with status 400".into()
            }
        );
    }

    #[test]
    fn error_bodies_follow_declared_content_type() {
        assert_eq!(
            classify(500, Some("text/plain"), b"42", false),
            ResponseOutcome::ClientError { status: 500, message: "42".into() }
        );
        let outcome = classify(409, Some("text/html"), br#"{"message":"already exists"}"#, false);
        assert_eq!(
            outcome,
            ResponseOutcome::ClientError {
                status: 409,
                message: r#"{"message":"already exists"}"#.into()
            }
        );
    }

    #[test]
    fn unauthenticated_text_body_is_not_an_expiry() {
        let body = br#"{"message":"Unauthenticated."}"#;
        let outcome = classify(403, Some("text/html"), body, true);
        assert_eq!(
            outcome,
            ResponseOutcome::ClientError {
                status: 403,
                message: r#"{"message":"Unauthenticated."}"#.into()
            }
        );
    }

    #[test]
    fn payload_into_value() {
        assert_eq!(Payload::Text("x".into()).into_value(), json!("x"));
        assert_eq!(Payload::Absent.into_value(), Value::Null);
    }
}
