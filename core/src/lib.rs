//! Client core for the portal backend.
//!
//! # Overview
//! Builds `HttpRequest` values, sends them through a pluggable `Transport`,
//! and classifies each `HttpResponse` as success, client error, or expired
//! session. Also carries the client-side state containers (current user,
//! permissions and roles, theme) and base URL configuration.
//!
//! # Design
//! - Request building (`request`) and response classification (`response`)
//!   are pure functions; `ApiClient` wires them to its collaborators.
//! - The host supplies three collaborators as traits: `Transport`,
//!   `CredentialStore`, `Navigator`. `ReqwestTransport`, `TokenStore` and
//!   `MemoryNavigator` / `DetachedNavigator` are the bundled implementations.
//! - Callers get `Result<T, ApiError>`; an expired session surfaces as the
//!   `ApiError::AuthRedirect` sentinel after the redirect has been issued.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod navigator;
pub mod observable;
pub mod request;
pub mod response;
pub mod storage;
pub mod stores;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::Config;
pub use credentials::{CredentialStore, TokenStore};
pub use error::{ApiError, StorageError, TransportError};
pub use http::{FormData, FormValue, HttpMethod, HttpRequest, HttpResponse, WireBody};
pub use navigator::{DetachedNavigator, MemoryNavigator, NavigateOptions, Navigator};
pub use observable::{Observable, Subscription};
pub use request::{build_request, join_url, ApiRequest, RequestBody};
pub use response::{classify, Payload, ResponseOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use stores::{AccessState, Theme, ThemeState, UserState};
pub use transport::{ReqwestTransport, Transport};
pub use types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserPatch};
