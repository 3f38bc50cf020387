//! Application state containers built on `Observable`.

pub mod access;
pub mod theme;
pub mod user;

pub use access::AccessState;
pub use theme::{Theme, ThemeState, THEME_KEY};
pub use user::UserState;
