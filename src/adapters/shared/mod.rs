//! Shared utilities for exchange adapters
//!
//! - [`client`] - transport wrapper with backend identity and error mapping
//! - [`signing`] - HMAC request signing
//! - [`wire`] - loose numeric/boolean wire shapes

pub mod client;
pub mod signing;
pub mod wire;

pub use client::{BackendClient, UpstreamErrorFn};
pub use signing::{hmac_sha256_hex, hmac_sha512_hex, HmacSha256Signer, RequestSigner};
pub use wire::NumberOrString;
