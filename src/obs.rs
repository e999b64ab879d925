//! Optional observability helpers for token and rate-limit operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_gate.op` with the `op` and `stage`
//!   fields, plus `debug` events describing why a token or request was rejected.
//! - Enable `metrics` to increment the `token_gate_op_total` counter for every outcome, labeled by
//!   `op` + `outcome`, and `token_gate_rejection_total` for every rejection, labeled by `op` +
//!   `reason` (for example `signature`, `expired`, or `over_budget`).
//!
//! With both features disabled every helper compiles to a no-op and the crate logs nothing.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Token minting.
	Mint,
	/// Token verification.
	Verify,
	/// Rate-limit consumption (including peeks).
	Consume,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Mint => "mint",
			OpKind::Verify => "verify",
			OpKind::Consume => "consume",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Token issued or verified, or request admitted.
	Accepted,
	/// Token refused or request denied.
	Rejected,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Accepted => "accepted",
			OpOutcome::Rejected => "rejected",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
