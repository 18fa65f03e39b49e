/// Authentication module
///
/// Password hashing, JWT issuance/validation and refresh token storage.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod token_service;

pub use claims::Claims;
pub use jwt::TokenPair;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::InMemoryRefreshTokenStore;
pub use refresh_token::PgRefreshTokenStore;
pub use refresh_token::RefreshTokenRecord;
pub use refresh_token::RefreshTokenStore;
pub use token_service::TokenService;
