//! In-memory sliding-window rate limiting keyed by arbitrary discriminators.
//!
//! Each key keeps an exact sliding log of admitted permits, so no `window`-wide trailing interval
//! ever admits more than `limit` permits. State lives in the [`RateLimiter`] value itself; clones
//! share it, and nothing is process-global.

pub mod decision;

mod window;

pub use decision::*;

// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	error::ConfigError,
	obs::{self, OpKind, OpOutcome, OpSpan},
};
use window::SlidingLog;

type KeyMap = Arc<RwLock<HashMap<String, Arc<Mutex<SlidingLog>>>>>;

/// Sliding-window rate limiter with per-key state.
///
/// Calls for different keys only share the map's read lock; the check-then-record for a single
/// key runs under that key's own mutex.
#[derive(Clone)]
pub struct RateLimiter {
	limit: u32,
	window: Duration,
	clock: Arc<dyn Clock>,
	keys: KeyMap,
}
impl RateLimiter {
	/// Creates a limiter admitting `limit` permits per `window`.
	pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigError> {
		if limit == 0 {
			return Err(ConfigError::ZeroLimit);
		}
		if !window.is_positive() {
			return Err(ConfigError::NonPositiveWindow { seconds: window.whole_seconds() });
		}

		Ok(Self { limit, window, clock: clock::system(), keys: Default::default() })
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Configured admissions per window.
	pub fn limit(&self) -> u32 {
		self.limit
	}

	/// Configured window length.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Consumes one permit for `key`, returning whether it was admitted.
	pub fn is_allowed(&self, key: &str) -> bool {
		self.consume(key, 1).accepted
	}

	/// Attempts to consume `permits` for `key`.
	///
	/// Denied attempts leave the key untouched. `permits == 0` is a pure peek that is always
	/// accepted and never creates state for an unseen key.
	pub fn consume(&self, key: &str, permits: u32) -> RateLimit {
		let _guard = OpSpan::new(OpKind::Consume, "consume").entered();
		let now = self.clock.now();

		if permits == 0 {
			let snapshot = self.snapshot_at(key, now);

			return RateLimit {
				accepted: true,
				limit: self.limit,
				remaining: snapshot.remaining,
				reset_at: snapshot.reset_at,
				retry_after: Some(now),
			};
		}

		let entry = self.log_for(key);
		let mut log = entry.lock();
		let decision = self.decide(&mut log, now, permits);

		drop(log);

		if decision.accepted {
			obs::record_op_outcome(OpKind::Consume, OpOutcome::Accepted);
		} else {
			obs::trace_rejection(
				OpKind::Consume,
				&format_args!("{permits} permit(s) over budget"),
			);
			obs::record_op_rejection(OpKind::Consume, obs::OVER_BUDGET);
		}

		decision
	}

	/// Remaining admissions for `key` and the instant the budget fully replenishes.
	///
	/// Never mutates state; unseen keys report the full limit resetting now.
	pub fn peek(&self, key: &str) -> RateLimitSnapshot {
		self.snapshot_at(key, self.clock.now())
	}

	/// Remaining admissions for `key`.
	pub fn remaining(&self, key: &str) -> u32 {
		self.peek(key).remaining
	}

	/// Remaining-budget metadata for `key`: the configured limit plus [`peek`](Self::peek).
	pub fn headers(&self, key: &str) -> RateLimitHeaders {
		let RateLimitSnapshot { remaining, reset_at } = self.peek(key);

		RateLimitHeaders { limit: self.limit, remaining, reset_at }
	}

	/// Number of keys currently holding state.
	pub fn tracked_keys(&self) -> usize {
		self.keys.read().len()
	}

	/// Drops keys with no admissions left in the window; returns how many were removed.
	///
	/// Keys another caller is using at that moment are kept.
	pub fn evict_idle(&self) -> usize {
		let now = self.clock.now();
		let mut keys = self.keys.write();
		let before = keys.len();

		// A clone held elsewhere means a caller is mid-operation on that key.
		keys.retain(|_, log| {
			Arc::strong_count(log) > 1 || !log.lock().is_idle(now, self.window)
		});

		before - keys.len()
	}

	fn decide(&self, log: &mut SlidingLog, now: OffsetDateTime, permits: u32) -> RateLimit {
		let accepted = log.try_admit(now, self.window, self.limit, permits);
		let used = log.used_at(now, self.window);

		RateLimit {
			accepted,
			limit: self.limit,
			remaining: self.remaining_from(used),
			reset_at: log.reset_at(now, self.window),
			retry_after: if accepted {
				Some(now)
			} else {
				log.retry_at(now, self.window, self.limit, permits)
			},
		}
	}

	fn snapshot_at(&self, key: &str, now: OffsetDateTime) -> RateLimitSnapshot {
		let Some(entry) = self.keys.read().get(key).cloned() else {
			return RateLimitSnapshot { remaining: self.limit, reset_at: now };
		};
		let log = entry.lock();

		RateLimitSnapshot {
			remaining: self.remaining_from(log.used_at(now, self.window)),
			reset_at: log.reset_at(now, self.window),
		}
	}

	fn log_for(&self, key: &str) -> Arc<Mutex<SlidingLog>> {
		if let Some(log) = self.keys.read().get(key) {
			return log.clone();
		}

		self.keys.write().entry(key.to_owned()).or_default().clone()
	}

	fn remaining_from(&self, used: u64) -> u32 {
		u32::try_from(u64::from(self.limit).saturating_sub(used)).unwrap_or(0)
	}
}
impl Debug for RateLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter")
			.field("limit", &self.limit)
			.field("window", &self.window)
			.field("tracked_keys", &self.tracked_keys())
			.finish_non_exhaustive()
	}
}
