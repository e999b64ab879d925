//! Injectable time sources so expiry and window rollover can be driven deterministically.

// self
use crate::_prelude::*;

/// Source of the current instant consulted by the token authority and the rate limiter.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven clock for tests and simulations.
///
/// Share it through an [`Arc`] so the test keeps a handle while the component under test reads
/// the same instant.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at the provided instant.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(Mutex::new(instant))
	}

	/// Creates a clock frozen at the given unix timestamp (seconds).
	pub fn at_unix(seconds: i64) -> Self {
		Self::new(OffsetDateTime::UNIX_EPOCH + Duration::seconds(seconds))
	}

	/// Moves the clock to the provided instant; going backwards is allowed.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}

	/// Moves the clock to the given unix timestamp (seconds).
	pub fn set_unix(&self, seconds: i64) {
		self.set(OffsetDateTime::UNIX_EPOCH + Duration::seconds(seconds));
	}

	/// Advances the clock by `by`.
	pub fn advance(&self, by: Duration) {
		let mut now = self.0.lock();

		*now += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

pub(crate) fn system() -> Arc<dyn Clock> {
	Arc::new(SystemClock)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn manual_clock_moves_only_when_told() {
		let clock = ManualClock::at_unix(1_000);

		assert_eq!(clock.now().unix_timestamp(), 1_000);

		clock.advance(Duration::seconds(61));

		assert_eq!(clock.now().unix_timestamp(), 1_061);

		clock.set_unix(10);

		assert_eq!(clock.now().unix_timestamp(), 10);
	}

	#[test]
	fn shared_handle_observes_updates() {
		let clock = Arc::new(ManualClock::at_unix(0));
		let reader: Arc<dyn Clock> = clock.clone();

		clock.advance(Duration::minutes(5));

		assert_eq!(reader.now().unix_timestamp(), 300);
	}

	#[test]
	fn system_clock_is_close_to_now() {
		let before = OffsetDateTime::now_utc();
		let observed = SystemClock.now();

		assert!(observed >= before);
		assert!(observed - before < Duration::seconds(5));
	}
}
