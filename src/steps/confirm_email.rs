//! Makes sure the bound user carries an email address, asking for one when needed.

// crates.io
use validator::Validate;
// self
use crate::{
	_prelude::*,
	pipeline::{
		FormErrors, PipelineState, PipelineStep, StepContext, StepFuture, StepOutcome, StepRequest,
	},
	view::{EmailForm, View},
};

/// Message shown for a malformed address.
pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";

#[derive(Debug, Validate)]
struct EmailSubmission {
	#[validate(
		required(message = "This field is required."),
		email(message = "Enter a valid email address.")
	)]
	email: Option<String>,
}
impl EmailSubmission {
	fn from_request(request: &StepRequest) -> Self {
		let email = request
			.field("email")
			.map(str::trim)
			.filter(|email| !email.is_empty())
			.map(str::to_owned);

		Self { email }
	}
}

/// Confirms the user's email.
///
/// An identity already linked for this provider and remote id wins: its stored email replaces
/// the fetched one. Without an email the step renders [`View::EnterEmail`] until a valid address
/// is submitted.
#[derive(Clone, Debug, Default)]
pub struct ConfirmEmail;
impl PipelineStep for ConfirmEmail {
	fn name(&self) -> &'static str {
		"confirm_email"
	}

	fn handle<'a>(
		&'a self,
		ctx: &'a StepContext,
		request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a> {
		Box::pin(async move {
			let remote_id = state.require_user()?.id.clone();
			let linked = ctx.identities.find(&ctx.provider_model, &remote_id).await?;
			let mut email = state.require_user()?.email.clone();

			if let Some(identity) = linked {
				email = Some(identity.email).filter(|email| !email.trim().is_empty());
			}
			if let Some(email) = email {
				state.require_user_mut()?.email = Some(email);

				return Ok(StepOutcome::Next);
			}
			if !request.is_bound() {
				return Ok(StepOutcome::Render(View::EnterEmail(EmailForm::default())));
			}

			let submission = EmailSubmission::from_request(request);

			match (submission.validate(), submission.email) {
				(Ok(()), Some(email)) => {
					state.require_user_mut()?.email = Some(email);

					Ok(StepOutcome::Next)
				},
				(result, email) => {
					let errors = result.err().map(FormErrors::from).unwrap_or_default();
					let echoed = request.field("email").map(str::to_owned).or(email);

					Ok(StepOutcome::Render(View::EnterEmail(EmailForm {
						email: echoed.unwrap_or_default(),
						errors,
					})))
				},
			}
		})
	}
}
