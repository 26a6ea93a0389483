//! Credential service implementations.

pub mod jwt;

pub use jwt::JwtTokenService;
