//! Per-key sliding log of admitted permits.

// std
use std::collections::VecDeque;
// crates.io
use time::PrimitiveDateTime;
// self
use crate::_prelude::*;

#[derive(Clone, Copy, Debug)]
struct Admission {
	at: OffsetDateTime,
	permits: u32,
}

/// Admissions recorded for one key, oldest first, with a running total of their permits.
///
/// An admission counts against the budget while `now - at < window`. Entries are kept in
/// non-decreasing `at` order (a clock that steps backwards records at the newest instant seen), so
/// aged-out entries always form a prefix of the log.
#[derive(Debug, Default)]
pub(crate) struct SlidingLog {
	entries: VecDeque<Admission>,
	used: u64,
}
impl SlidingLog {
	/// Permits still counting against the budget at `now`.
	pub(crate) fn used_at(&self, now: OffsetDateTime, window: Duration) -> u64 {
		let aged: u64 = self.aged_out(now, window).map(|a| u64::from(a.permits)).sum();

		self.used - aged
	}

	/// Instant at which every live admission has aged out, or `now` when none are live.
	pub(crate) fn reset_at(&self, now: OffsetDateTime, window: Duration) -> OffsetDateTime {
		match self.entries.back() {
			Some(newest) if now - newest.at < window => expiry(newest.at, window),
			_ => now,
		}
	}

	/// Earliest instant at which `permits` more would fit under `limit`.
	///
	/// `None` when `permits` exceeds `limit` and can never fit.
	pub(crate) fn retry_at(
		&self,
		now: OffsetDateTime,
		window: Duration,
		limit: u32,
		permits: u32,
	) -> Option<OffsetDateTime> {
		if permits > limit {
			return None;
		}

		let overflow =
			(self.used_at(now, window) + u64::from(permits)).saturating_sub(u64::from(limit));

		if overflow == 0 {
			return Some(now);
		}

		let mut freed = 0_u64;

		for admission in self.entries.iter().skip_while(|a| now - a.at >= window) {
			freed += u64::from(admission.permits);

			if freed >= overflow {
				return Some(expiry(admission.at, window));
			}
		}

		// Unreachable while the running total matches the log; fall back to a full reset.
		Some(self.reset_at(now, window))
	}

	/// Records `permits` at `now` if they fit under `limit`; drops aged-out entries first.
	pub(crate) fn try_admit(
		&mut self,
		now: OffsetDateTime,
		window: Duration,
		limit: u32,
		permits: u32,
	) -> bool {
		self.prune(now, window);

		if self.used + u64::from(permits) > u64::from(limit) {
			return false;
		}
		if permits > 0 {
			let at = self.entries.back().map_or(now, |newest| newest.at.max(now));

			self.entries.push_back(Admission { at, permits });
			self.used += u64::from(permits);
		}

		true
	}

	/// `true` when nothing counts against the budget at `now`.
	pub(crate) fn is_idle(&self, now: OffsetDateTime, window: Duration) -> bool {
		self.entries.back().is_none_or(|newest| now - newest.at >= window)
	}

	fn prune(&mut self, now: OffsetDateTime, window: Duration) {
		while let Some(oldest) = self.entries.front() {
			if now - oldest.at < window {
				break;
			}

			self.used -= u64::from(oldest.permits);
			self.entries.pop_front();
		}
	}

	fn aged_out(&self, now: OffsetDateTime, window: Duration) -> impl Iterator<Item = &Admission> {
		self.entries.iter().take_while(move |a| now - a.at >= window)
	}
}

/// `at + window`, saturating at the largest representable instant.
fn expiry(at: OffsetDateTime, window: Duration) -> OffsetDateTime {
	at.checked_add(window).unwrap_or(PrimitiveDateTime::MAX.assume_utc())
}
