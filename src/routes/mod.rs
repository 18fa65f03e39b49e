mod auth;
mod health_check;

pub use auth::{activate, list_users, login, logout, refresh, register, REFRESH_COOKIE};
pub use health_check::health_check;
