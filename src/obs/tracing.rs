// self
use crate::{_prelude::*, obs::OpKind};

/// A span builder used around token and rate-limit operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("token_gate.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for the remainder of the current scope.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a `debug` event explaining a rejection inside the current span (when enabled).
///
/// `reason` must never carry token text or secret material.
pub fn trace_rejection(kind: OpKind, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = kind.as_str(), %reason, "operation rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn op_span_noop_without_tracing() {
		let _guard = OpSpan::new(OpKind::Mint, "test").entered();

		trace_rejection(OpKind::Mint, &"nothing to see");
	}
}
