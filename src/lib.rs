//! Stateless HMAC-signed bearer tokens and an in-memory sliding-window rate limiter.
//!
//! - [`auth::TokenAuthority`] mints and verifies self-contained tokens that carry an identity and
//!   an expiry; nothing is stored server-side.
//! - [`limit::RateLimiter`] admits or rejects work per key under a sliding-window quota and reports
//!   the remaining budget.
//!
//! Both read time through an injectable [`clock::Clock`], and neither depends on the other.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod limit;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use color_eyre as _;
