/// Authentication module
///
/// Password hashing, bearer header parsing, JWT access tokens, stored
/// refresh tokens, and the session issuer that combines them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::{authorization_header, extract_bearer_token};
pub use claims::{Claims, ISSUER};
pub use jwt::{generate_access_token, validate_access_token, MAX_ACCESS_TOKEN_TTL_SECONDS};
pub use password::{hash_password, verify_password};
pub use refresh_token::{generate_refresh_token, hash_token, RefreshTokenStore};
pub use session::{Session, SessionIssuer};
