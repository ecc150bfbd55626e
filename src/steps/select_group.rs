//! Setup-time selection of the group that gates future logins.

// self
use crate::{
	_prelude::*,
	api::{AccessLevel, GitLabApi, RemoteGroup},
	pipeline::{
		FormErrors, MSG_REQUIRED, PipelineState, PipelineStep, StepContext, StepFuture,
		StepOutcome, StepRequest,
	},
	view::{GroupChoice, GroupForm, View},
};

/// Lists the administrator's groups and binds the chosen one as `group`.
///
/// The choice list is fetched on every request, so a submitted id is only accepted when it is
/// still among the groups the administrator can see.
#[derive(Clone, Debug)]
pub struct SelectGroup {
	api: GitLabApi,
}
impl SelectGroup {
	/// Creates the step.
	pub fn new(api: GitLabApi) -> Self {
		Self { api }
	}
}
impl PipelineStep for SelectGroup {
	fn name(&self) -> &'static str {
		"select_group"
	}

	fn handle<'a>(
		&'a self,
		_ctx: &'a StepContext,
		request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a> {
		Box::pin(async move {
			let groups = {
				let client = self.api.open(state.access_token()?)?;

				client.list_user_groups(AccessLevel::Guest).await?
			};
			let choices = groups.iter().map(GroupChoice::from).collect::<Vec<_>>();

			if !request.is_bound() {
				return Ok(StepOutcome::Render(View::SelectGroup(GroupForm {
					choices,
					..Default::default()
				})));
			}

			let selected = request.field("group").map(str::trim).filter(|id| !id.is_empty());

			match resolve_choice(&groups, selected) {
				Ok(group) => {
					state.bind_group(group);

					Ok(StepOutcome::Next)
				},
				Err(errors) => Ok(StepOutcome::Render(View::SelectGroup(GroupForm {
					choices,
					selected: selected.map(str::to_owned),
					errors,
				}))),
			}
		})
	}
}

fn resolve_choice(groups: &[RemoteGroup], selected: Option<&str>) -> Result<RemoteGroup, FormErrors> {
	let mut errors = FormErrors::default();
	let Some(id) = selected else {
		errors.add("group", MSG_REQUIRED);

		return Err(errors);
	};

	match groups.iter().find(|group| group.id.as_str() == id) {
		Some(group) => Ok(group.clone()),
		None => {
			errors.add(
				"group",
				format!("Select a valid choice. {id} is not one of the available choices."),
			);

			Err(errors)
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::RemoteId;

	fn groups() -> Vec<RemoteGroup> {
		vec![
			RemoteGroup { id: RemoteId::from(1), name: "A".into() },
			RemoteGroup { id: RemoteId::from(2), name: "B".into() },
		]
	}

	#[test]
	fn resolves_listed_ids_only() {
		let group = resolve_choice(&groups(), Some("2")).expect("Listed id should resolve.");

		assert_eq!(group, RemoteGroup { id: RemoteId::from(2), name: "B".into() });

		let errors = resolve_choice(&groups(), Some("9")).expect_err("Unlisted id should fail.");

		assert_eq!(
			errors.get("group"),
			["Select a valid choice. 9 is not one of the available choices.".to_owned()]
		);

		let errors = resolve_choice(&groups(), None).expect_err("Missing id should fail.");

		assert_eq!(errors.get("group"), [MSG_REQUIRED.to_owned()]);
	}
}
