//! Client side of the external face verification service.

pub mod error;
pub mod gateway;
pub mod http;

pub use error::GatewayError;
pub use gateway::{BiometricGateway, FaceMatch};
pub use http::HttpBiometricGateway;
