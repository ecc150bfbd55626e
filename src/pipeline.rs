//! Resumable, ordered step pipelines.
//!
//! A [`Pipeline`] is an ordered list of [`PipelineStep`] values assembled by a provider. Its
//! progress lives in a [`PipelineSession`] that the host persists between HTTP requests; every
//! inbound request calls [`Pipeline::advance`], which runs the current step and keeps going
//! until a step halts or the list is exhausted.

pub mod form;
pub mod state;
pub mod step;

pub use form::*;
pub use state::*;
pub use step::*;

// self
use crate::{
	_prelude::*,
	error::PipelineError,
	obs::{self, ObsSpan, StepOutcomeLabel},
};

/// Which of the provider's two pipelines a session belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
	/// Login-time pipeline.
	Auth,
	/// Admin-time configuration pipeline.
	Setup,
}
impl PipelineKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PipelineKind::Auth => "auth",
			PipelineKind::Setup => "setup",
		}
	}
}
impl Display for PipelineKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Persisted progress of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSession {
	/// Pipeline the session was started for.
	pub kind: PipelineKind,
	/// Index of the step the next request is routed to.
	pub step_index: usize,
	/// Shared state written by completed steps.
	pub state: PipelineState,
}
impl PipelineSession {
	/// Starts an empty session for `kind`.
	pub fn new(kind: PipelineKind) -> Self {
		Self { kind, step_index: 0, state: PipelineState::default() }
	}
}

/// Result of [`Pipeline::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineProgress {
	/// A step halted; respond with its outcome and persist the session.
	Halted(StepOutcome),
	/// Every step finished; the session state is ready for identity/config materialization.
	Completed,
}

/// Ordered list of steps.
#[derive(Clone, Debug)]
pub struct Pipeline {
	kind: PipelineKind,
	steps: Vec<Arc<dyn PipelineStep>>,
}
impl Pipeline {
	/// Creates an empty pipeline of `kind`.
	pub fn new(kind: PipelineKind) -> Self {
		Self { kind, steps: Vec::new() }
	}

	/// Appends a step.
	pub fn with_step(mut self, step: impl 'static + PipelineStep) -> Self {
		self.steps.push(Arc::new(step));

		self
	}

	/// Appends every step of `other`, keeping this pipeline's kind.
	pub fn extend(mut self, other: Pipeline) -> Self {
		self.steps.extend(other.steps);

		self
	}

	/// Pipeline kind.
	pub fn kind(&self) -> PipelineKind {
		self.kind
	}

	/// Number of steps.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Returns `true` when the pipeline has no steps.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Step names in execution order.
	pub fn step_names(&self) -> Vec<&'static str> {
		self.steps.iter().map(|step| step.name()).collect()
	}

	/// Starts a fresh session for this pipeline.
	pub fn start(&self) -> PipelineSession {
		PipelineSession::new(self.kind)
	}

	/// Drives `session` with the inbound `request`.
	///
	/// Submitted form fields are only shown to the step they were addressed to; steps reached
	/// after a [`StepOutcome::Next`] in the same cycle see a `GET` carrying just the query string,
	/// so a provider callback can flow from the login step into the callback step. Errors abort
	/// the run and leave the session at the failing step.
	pub async fn advance(
		&self,
		session: &mut PipelineSession,
		ctx: &StepContext,
		request: &StepRequest,
	) -> Result<PipelineProgress> {
		if session.kind != self.kind {
			return Err(PipelineError::KindMismatch {
				expected: self.kind.as_str(),
				found: session.kind.as_str(),
			}
			.into());
		}
		if session.step_index >= self.steps.len() {
			return Err(PipelineError::Completed.into());
		}

		let follow_up = request.follow_up();
		let mut request = request;

		while let Some(step) = self.steps.get(session.step_index) {
			let name = step.name();
			let span = ObsSpan::step(self.kind.as_str(), name);

			obs::record_step_outcome(name, StepOutcomeLabel::Attempt);

			let outcome = span.instrument(step.handle(ctx, request, &mut session.state)).await;

			match outcome {
				Ok(StepOutcome::Next) => {
					obs::record_step_outcome(name, StepOutcomeLabel::Advance);

					session.step_index += 1;
					request = &follow_up;
				},
				Ok(halt) => {
					obs::record_step_outcome(name, StepOutcomeLabel::Halt);

					return Ok(PipelineProgress::Halted(halt));
				},
				Err(err) => {
					obs::record_step_outcome(name, StepOutcomeLabel::Failure);

					return Err(err);
				},
			}
		}

		Ok(PipelineProgress::Completed)
	}
}
