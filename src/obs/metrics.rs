// self
use crate::obs::{RefreshOutcome, StepOutcomeLabel};

/// Records a step outcome via the global metrics recorder (when enabled).
pub fn record_step_outcome(step: &'static str, outcome: StepOutcomeLabel) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_gitlab_step_total",
			"step" => step,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (step, outcome);
	}
}

/// Records an identity refresh verdict via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("auth_gitlab_identity_refresh_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
