pub mod claims;
pub mod delegated;
pub mod gate;
pub mod token;

pub use claims::{Claim, ClaimType, Role};
pub use delegated::{DelegatedAuthorizer, DelegatedError, HttpDelegatedAuthorizer};
pub use gate::{RequestLine, RoutePolicy, Verdict, authorize};
pub use token::{TokenCodec, TokenError};
