//! Authentication: accounts, sessions and the request extractor.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use middleware::{AuthContext, SESSION_COOKIE_NAME};
