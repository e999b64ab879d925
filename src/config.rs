//! Startup configuration for the token authority and the rate limiter.

// self
use crate::{
	_prelude::*,
	auth::TokenAuthority,
	clock::{self, Clock},
	error::ConfigError,
	limit::RateLimiter,
};

/// Environment variable holding the signing secret (required).
pub const ENV_SECRET_KEY: &str = "TOKEN_GATE_SECRET_KEY";
/// Environment variable holding the token lifetime in seconds.
pub const ENV_TOKEN_TTL: &str = "TOKEN_GATE_TOKEN_TTL";
/// Environment variable holding the rate-limit window in seconds.
pub const ENV_RATE_LIMIT_WINDOW: &str = "TOKEN_GATE_RATE_LIMIT_WINDOW";
/// Environment variable holding the admissions allowed per window.
pub const ENV_RATE_LIMIT_PER_WINDOW: &str = "TOKEN_GATE_RATE_LIMIT_PER_WINDOW";

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3_600;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: i64 = 60;
const DEFAULT_RATE_LIMIT_PER_WINDOW: u32 = 60;

/// Values needed to build a [`TokenAuthority`] and a [`RateLimiter`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct GateConfig {
	/// Shared HMAC secret; never logged.
	pub secret_key: String,
	/// Token lifetime in seconds; zero or negative mints already-expiring tokens.
	#[serde(default = "default_token_ttl_seconds")]
	pub token_ttl_seconds: i64,
	/// Sliding-window length in seconds.
	#[serde(default = "default_rate_limit_window_seconds")]
	pub rate_limit_window_seconds: i64,
	/// Admissions allowed per window and key.
	#[serde(default = "default_rate_limit_per_window")]
	pub rate_limit_per_window: u32,
}
impl GateConfig {
	/// Creates a configuration with the given secret and default limits.
	pub fn new(secret_key: impl Into<String>) -> Self {
		Self {
			secret_key: secret_key.into(),
			token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
			rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
			rate_limit_per_window: DEFAULT_RATE_LIMIT_PER_WINDOW,
		}
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// Blank values count as absent; optional variables fall back to their defaults.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &'static str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let secret_key =
			read(ENV_SECRET_KEY).ok_or(ConfigError::MissingVar { name: ENV_SECRET_KEY })?;

		Ok(Self {
			secret_key,
			token_ttl_seconds: parse_or(
				read(ENV_TOKEN_TTL),
				ENV_TOKEN_TTL,
				DEFAULT_TOKEN_TTL_SECONDS,
			)?,
			rate_limit_window_seconds: parse_or(
				read(ENV_RATE_LIMIT_WINDOW),
				ENV_RATE_LIMIT_WINDOW,
				DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
			)?,
			rate_limit_per_window: parse_or(
				read(ENV_RATE_LIMIT_PER_WINDOW),
				ENV_RATE_LIMIT_PER_WINDOW,
				DEFAULT_RATE_LIMIT_PER_WINDOW,
			)?,
		})
	}

	/// Builds a [`TokenAuthority`] on the system clock.
	pub fn token_authority(&self) -> Result<TokenAuthority, ConfigError> {
		self.token_authority_with_clock(clock::system())
	}

	/// Builds a [`TokenAuthority`] reading time from `clock`.
	pub fn token_authority_with_clock(
		&self,
		clock: Arc<dyn Clock>,
	) -> Result<TokenAuthority, ConfigError> {
		Ok(TokenAuthority::new(&self.secret_key, self.token_ttl_seconds)?.with_clock(clock))
	}

	/// Builds a [`RateLimiter`] on the system clock.
	pub fn rate_limiter(&self) -> Result<RateLimiter, ConfigError> {
		self.rate_limiter_with_clock(clock::system())
	}

	/// Builds a [`RateLimiter`] reading time from `clock`.
	pub fn rate_limiter_with_clock(
		&self,
		clock: Arc<dyn Clock>,
	) -> Result<RateLimiter, ConfigError> {
		Ok(RateLimiter::new(
			self.rate_limit_per_window,
			Duration::seconds(self.rate_limit_window_seconds),
		)?
		.with_clock(clock))
	}
}
impl Debug for GateConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GateConfig")
			.field("secret_key", &"<redacted>")
			.field("token_ttl_seconds", &self.token_ttl_seconds)
			.field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
			.field("rate_limit_per_window", &self.rate_limit_per_window)
			.finish()
	}
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
	T: FromStr,
{
	match raw {
		Some(value) => value.parse().map_err(|_| ConfigError::InvalidVar { name, value }),
		None => Ok(default),
	}
}

fn default_token_ttl_seconds() -> i64 {
	DEFAULT_TOKEN_TTL_SECONDS
}

fn default_rate_limit_window_seconds() -> i64 {
	DEFAULT_RATE_LIMIT_WINDOW_SECONDS
}

fn default_rate_limit_per_window() -> u32 {
	DEFAULT_RATE_LIMIT_PER_WINDOW
}
