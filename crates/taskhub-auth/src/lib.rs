//! # taskhub-auth
//!
//! JWT-based credential verification for TaskHub. Token issuance
//! (login/registration) lives outside this codebase; this crate provides
//! the encoder used by that collaborator and the decoder the real-time
//! layer uses to resolve bearer tokens to user ids.

pub mod jwt;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
