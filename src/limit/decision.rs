//! Admission results and the remaining-budget metadata derived from them.

// self
use crate::_prelude::*;

/// Header carrying the configured per-window limit.
pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
/// Header carrying the admissions still available in the current window.
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
/// Header carrying the unix timestamp at which the budget is fully replenished.
pub const HEADER_RESET: &str = "X-RateLimit-Reset";

/// Outcome of [`RateLimiter::consume`](crate::limit::RateLimiter::consume).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
	/// Whether the requested permits were admitted.
	pub accepted: bool,
	/// Configured admissions per window.
	pub limit: u32,
	/// Admissions still available after this decision.
	pub remaining: u32,
	/// Instant at which the budget is fully replenished.
	pub reset_at: OffsetDateTime,
	/// Earliest instant at which the same request would be admitted.
	///
	/// `None` when the request asks for more permits than the limit allows.
	pub retry_after: Option<OffsetDateTime>,
}
impl RateLimit {
	/// `true` when the permits were admitted.
	pub fn is_accepted(&self) -> bool {
		self.accepted
	}

	/// Remaining-budget metadata for this decision.
	pub fn headers(&self) -> RateLimitHeaders {
		RateLimitHeaders { limit: self.limit, remaining: self.remaining, reset_at: self.reset_at }
	}
}

/// Non-mutating view of a key's budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSnapshot {
	/// Admissions currently available.
	pub remaining: u32,
	/// Instant at which the budget is fully replenished.
	pub reset_at: OffsetDateTime,
}

/// Rate-limit metadata surfaced to clients, typically as response headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RateLimitHeaders {
	/// Configured admissions per window.
	pub limit: u32,
	/// Admissions currently available.
	pub remaining: u32,
	/// Instant at which the budget is fully replenished, serialized as unix seconds.
	#[serde(with = "time::serde::timestamp")]
	pub reset_at: OffsetDateTime,
}
impl RateLimitHeaders {
	/// Renders `X-RateLimit-*` header name/value pairs.
	pub fn to_pairs(&self) -> [(&'static str, String); 3] {
		[
			(HEADER_LIMIT, self.limit.to_string()),
			(HEADER_REMAINING, self.remaining.to_string()),
			(HEADER_RESET, self.reset_at.unix_timestamp().to_string()),
		]
	}
}
