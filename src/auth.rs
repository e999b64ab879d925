//! Stateless bearer tokens: signing keys, wire claims, and the minting/verifying authority.
//!
//! A token is `base64(json(claims)) + "." + lowercase_hex(hmac_sha256(secret, base64_payload))`.
//! Nothing is stored server-side; validity depends only on the signature, the embedded expiry, and
//! the current time.

pub mod authority;
pub mod claims;
pub mod secret;

pub use authority::*;
pub use claims::*;
pub use secret::*;
