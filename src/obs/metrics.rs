// self
use crate::obs::{OpKind, OpOutcome};

/// Counter incremented for every operation, labeled by `op` + `outcome`.
pub const OP_TOTAL: &str = "token_gate_op_total";
/// Counter incremented for every rejection, labeled by `op` + `reason`.
pub const REJECTION_TOTAL: &str = "token_gate_rejection_total";

/// Rejection reason recorded when a rate-limit request exceeds the remaining budget.
pub const OVER_BUDGET: &str = "over_budget";

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(OP_TOTAL, "op" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a rejected operation together with its cause.
///
/// `reason` must come from a small fixed set (never a token, identity, or rate-limit key) so the
/// label stays low-cardinality.
pub fn record_op_rejection(kind: OpKind, reason: &'static str) {
	record_op_outcome(kind, OpOutcome::Rejected);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(REJECTION_TOTAL, "op" => kind.as_str(), "reason" => reason).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_a_global_recorder() {
		record_op_outcome(OpKind::Verify, OpOutcome::Accepted);
		record_op_rejection(OpKind::Verify, "signature");
		record_op_rejection(OpKind::Consume, OVER_BUDGET);
	}
}
