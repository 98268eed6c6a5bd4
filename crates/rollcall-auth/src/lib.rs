//! # rollcall-auth
//!
//! Authentication for Rollcall.
//!
//! - `password`: Argon2id credential hashing
//! - `jwt`: access and refresh tokens signed with independent secrets
//! - `session`: the device-bound session registry and the login, refresh,
//!   and sign-out flows built on it

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{TokenAuthority, TokenError, TokenKind, TokenPayload};
pub use password::CredentialHasher;
pub use session::{AuthManager, SessionRegistry};
