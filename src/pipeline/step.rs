//! Contract between pipeline steps and the runner.

// self
use crate::{
	_prelude::*,
	auth::AuthProviderId,
	error::{CallbackError, HaltError, PolicyError},
	pipeline::PipelineState,
	store::IdentityStore,
	view::View,
};

/// Boxed future returned by [`PipelineStep::handle`].
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<StepOutcome>> + 'a + Send>>;

/// One stage of an identity-linking pipeline.
///
/// A step may run many times for the same session (every re-render re-enters it). Policy and
/// form steps only write `state` on the path that returns [`StepOutcome::Next`], so a halted
/// attempt never leaves partial data behind.
pub trait PipelineStep
where
	Self: Send + Sync + Debug,
{
	/// Stable name used in spans, metrics, and [`crate::pipeline::Pipeline::step_names`].
	fn name(&self) -> &'static str;

	/// Handles one request for this step.
	///
	/// An `Err` aborts the run; halts the user should see are returned as outcomes.
	fn handle<'a>(
		&'a self,
		ctx: &'a StepContext,
		request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a>;
}

/// What a step decided for the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
	/// Continue with the next step.
	Next,
	/// Send the user agent elsewhere (e.g., the provider's authorize page).
	Redirect(Url),
	/// Render a form and wait for its submission.
	Render(View),
	/// Stop with a user-facing error.
	Error(HaltError),
}
impl StepOutcome {
	/// Returns `true` for [`StepOutcome::Next`].
	pub fn is_next(&self) -> bool {
		matches!(self, StepOutcome::Next)
	}
}
impl From<HaltError> for StepOutcome {
	fn from(error: HaltError) -> Self {
		StepOutcome::Error(error)
	}
}
impl From<PolicyError> for StepOutcome {
	fn from(error: PolicyError) -> Self {
		StepOutcome::Error(error.into())
	}
}
impl From<CallbackError> for StepOutcome {
	fn from(error: CallbackError) -> Self {
		StepOutcome::Error(error.into())
	}
}

/// HTTP method of the inbound request driving a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMethod {
	/// Initial display or redirect callback.
	#[default]
	Get,
	/// Form submission.
	Post,
}

/// Inbound request as seen by a step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepRequest {
	/// Request method.
	pub method: RequestMethod,
	/// Query-string parameters.
	pub query: BTreeMap<String, String>,
	/// Submitted form fields.
	pub form: BTreeMap<String, String>,
}
impl StepRequest {
	/// A plain `GET` with no parameters.
	pub fn get() -> Self {
		Self::default()
	}

	/// A `POST` carrying `form` fields.
	pub fn post<I, K, V>(form: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			method: RequestMethod::Post,
			form: form.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
			..Default::default()
		}
	}

	/// Adds a query-string parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());

		self
	}

	/// Reads a query-string parameter.
	pub fn query(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	/// Reads a submitted form field.
	pub fn field(&self, key: &str) -> Option<&str> {
		self.form.get(key).map(String::as_str)
	}

	/// Request handed to steps reached later in the same cycle: a `GET` with the same query.
	pub fn follow_up(&self) -> Self {
		Self { query: self.query.clone(), ..Default::default() }
	}

	/// Returns `true` when the request is a form submission with data.
	pub fn is_bound(&self) -> bool {
		self.method == RequestMethod::Post && !self.form.is_empty()
	}
}

/// Per-run collaborators handed to every step.
#[derive(Clone)]
pub struct StepContext {
	/// Configured provider instance this run belongs to.
	pub provider_model: AuthProviderId,
	/// Identities the host already linked.
	pub identities: Arc<dyn IdentityStore>,
	/// Callback URL the provider redirects back to.
	pub redirect_uri: Url,
}
impl StepContext {
	/// Creates a new context.
	pub fn new(
		provider_model: AuthProviderId,
		identities: Arc<dyn IdentityStore>,
		redirect_uri: Url,
	) -> Self {
		Self { provider_model, identities, redirect_uri }
	}
}
impl Debug for StepContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StepContext")
			.field("provider_model", &self.provider_model)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_non_empty_posts_are_bound() {
		assert!(!StepRequest::get().is_bound());
		assert!(!StepRequest::post(Vec::<(String, String)>::new()).is_bound());

		let request = StepRequest::post([("email", "a@b.com")]);

		assert!(request.is_bound());
		assert_eq!(request.field("email"), Some("a@b.com"));
	}

	#[test]
	fn halts_convert_into_outcomes() {
		let outcome = StepOutcome::from(PolicyError::NoGroupAccess);

		assert_eq!(outcome, StepOutcome::Error(HaltError::Policy(PolicyError::NoGroupAccess)));
		assert!(!outcome.is_next());
	}
}
