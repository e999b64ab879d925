//! Crate-level error types shared by the token authority, the rate limiter, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Token is malformed, carries a bad signature, or has expired.
	///
	/// The causes are deliberately indistinguishable to callers.
	#[error("Invalid or expired token.")]
	InvalidToken,

	/// Token claims could not be encoded while minting.
	#[error("Token claims could not be encoded.")]
	ClaimsEncode(#[from] serde_json::Error),
}

/// Configuration and validation failures raised while building components.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Signing secret was empty.
	#[error("Signing secret cannot be empty.")]
	EmptySecret,
	/// Signing secret could not key the MAC.
	#[error("Signing secret was rejected by the MAC implementation.")]
	InvalidSecret,
	/// Rate limit allows no admissions at all.
	#[error("Rate limit must allow at least one request per window.")]
	ZeroLimit,
	/// Rate limit window is zero or negative.
	#[error("Rate limit window must be positive, got {seconds} seconds.")]
	NonPositiveWindow {
		/// Offending window length in whole seconds.
		seconds: i64,
	},

	/// Required environment variable is absent.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` has an invalid value `{value}`.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Raw value as read from the environment.
		value: String,
	},
}
