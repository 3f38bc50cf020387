use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginOutput {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct Db {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    next_id: u64,
}

pub type SharedDb = Arc<RwLock<Db>>;

/// JSON error body in the `{"message": ...}` shape the client expects.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
    errors: Option<BTreeMap<&'static str, Vec<String>>>,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated.")
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = match self.errors {
            Some(errors) => json!({ "message": self.message, "errors": errors }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db::default()));
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/dashboard", get(dashboard))
        .with_state(db);
    Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock backend listening");
    }
    axum::serve(listener, app()).await
}

fn validate_registration(input: &RegisterInput, db: &Db) -> Result<(), Failure> {
    let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    if input.name.trim().is_empty() {
        errors.entry("name").or_default().push("The name field is required.".into());
    }
    if !input.email.contains('@') {
        errors.entry("email").or_default().push("The email field must be a valid email address.".into());
    } else if db.accounts.contains_key(&input.email.to_lowercase()) {
        errors.entry("email").or_default().push("The email has already been taken.".into());
    }
    if input.password.len() < 8 {
        errors.entry("password").or_default().push("The password field must be at least 8 characters.".into());
    }
    if input.password != input.password_confirmation {
        errors.entry("password").or_default().push("The password confirmation does not match.".into());
    }

    let Some(first) = errors.values().flatten().next().cloned() else {
        return Ok(());
    };
    Err(Failure {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: first,
        errors: Some(errors),
    })
}

async fn register(
    State(db): State<SharedDb>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    let mut db = db.write().await;
    validate_registration(&input, &db)?;

    db.next_id += 1;
    let user = User {
        id: db.next_id,
        name: input.name.trim().to_string(),
        email: input.email.to_lowercase(),
    };
    db.accounts.insert(
        user.email.clone(),
        Account {
            user: user.clone(),
            password: input.password,
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Registration successful.", "user": user })),
    ))
}

async fn login(
    State(db): State<SharedDb>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginOutput>, Failure> {
    let mut db = db.write().await;
    let email = input.email.to_lowercase();
    let user = match db.accounts.get(&email) {
        Some(account) if account.password == input.password => account.user.clone(),
        _ => return Err(Failure::new(StatusCode::UNAUTHORIZED, "Invalid credentials.")),
    };
    let token = Uuid::new_v4().simple().to_string();
    db.tokens.insert(token.clone(), email);
    Ok(Json(LoginOutput {
        access_token: token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

fn authenticate(db: &Db, headers: &HeaderMap) -> Result<User, Failure> {
    let token = bearer_token(headers).ok_or_else(Failure::unauthenticated)?;
    db.tokens
        .get(token)
        .and_then(|email| db.accounts.get(email))
        .map(|account| account.user.clone())
        .ok_or_else(Failure::unauthenticated)
}

async fn me(State(db): State<SharedDb>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    let db = db.read().await;
    authenticate(&db, &headers).map(Json)
}

async fn logout(State(db): State<SharedDb>, headers: HeaderMap) -> Result<StatusCode, Failure> {
    let mut db = db.write().await;
    authenticate(&db, &headers)?;
    if let Some(token) = bearer_token(&headers) {
        db.tokens.remove(token);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard(
    State(db): State<SharedDb>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Failure> {
    let db = db.read().await;
    let user = authenticate(&db, &headers)?;
    Ok(Json(json!({
        "user": user,
        "stats": {
            "accounts": db.accounts.len(),
            "active_sessions": db.tokens.len(),
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(password: &str, confirmation: &str) -> RegisterInput {
        RegisterInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn registration_accepts_valid_input() {
        assert!(validate_registration(&input("correct-horse", "correct-horse"), &Db::default()).is_ok());
    }

    #[test]
    fn registration_reports_confirmation_mismatch() {
        let failure = validate_registration(&input("correct-horse", "battery"), &Db::default()).unwrap_err();
        assert_eq!(failure.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(failure.message, "The password confirmation does not match.");
    }

    #[test]
    fn registration_reports_first_error_first() {
        let mut bad = input("short", "short");
        bad.name = " ".to_string();
        let failure = validate_registration(&bad, &Db::default()).unwrap_err();
        assert_eq!(failure.message, "The name field is required.");
        assert_eq!(failure.errors.unwrap().len(), 2);
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn user_serializes_to_json() {
        let user = User {
            id: 1,
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "t@example.com");
    }
}
