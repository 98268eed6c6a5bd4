//! Access and refresh token signing and verification.

pub mod authority;
pub mod claims;
pub mod error;

pub use authority::{IssuedToken, TokenAuthority};
pub use claims::{Claims, TokenKind, TokenPayload};
pub use error::TokenError;
