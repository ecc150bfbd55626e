//! Optional observability helpers for pipeline steps and identity refreshes.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit an `auth_gitlab.step` span (fields `pipeline`, `step`) around every
//!   executed step and an `auth_gitlab.refresh` span (field `provider`) around identity refreshes.
//! - Enable `metrics` to increment `auth_gitlab_step_total{step,outcome}` and
//!   `auth_gitlab_identity_refresh_total{outcome}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each step execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcomeLabel {
	/// Step entered.
	Attempt,
	/// Step finished and the pipeline moved on.
	Advance,
	/// Step halted with a redirect, form, or user-facing error.
	Halt,
	/// Step aborted the run with an error.
	Failure,
}
impl StepOutcomeLabel {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcomeLabel::Attempt => "attempt",
			StepOutcomeLabel::Advance => "advance",
			StepOutcomeLabel::Halt => "halt",
			StepOutcomeLabel::Failure => "failure",
		}
	}
}
impl Display for StepOutcomeLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Verdict of an identity refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Identity still satisfies the provider policy.
	Valid,
	/// Identity was invalidated.
	Invalid,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Valid => "valid",
			RefreshOutcome::Invalid => "invalid",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
