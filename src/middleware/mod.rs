/// Middleware module
///
/// Identity gate for protected routes and the file-server hit counter.

mod hits;
mod identity;

pub use hits::CountHits;
pub use identity::{AuthenticatedUser, RequireIdentity};
