//! Email/password authentication service: registration with one-time email
//! activation, login, refresh-token rotation and logout.

pub mod auth;
pub mod configuration;
pub mod directory;
pub mod email_client;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod startup;
pub mod telemetry;
pub mod validators;
