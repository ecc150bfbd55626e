//! Views a step asks the host to render.
//!
//! Markup is owned by the host; this module names the template and provides a serializable
//! context for it.

// self
use crate::{_prelude::*, api::RemoteGroup, pipeline::FormErrors};

/// Template for the email-entry form.
pub const TEMPLATE_ENTER_EMAIL: &str = "auth_gitlab/enter-email.html";
/// Template for the group-selection form.
pub const TEMPLATE_SELECT_GROUP: &str = "auth_gitlab/select-group.html";
/// Template for the static provider configuration page.
pub const TEMPLATE_CONFIGURE: &str = "auth_gitlab/configure.html";

/// Rendered output requested by a pipeline step or the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
	/// Ask the user for an email address.
	EnterEmail(EmailForm),
	/// Let the administrator pick the group that gates access.
	SelectGroup(GroupForm),
	/// Static configuration page.
	Configure,
}
impl View {
	/// Template reference for the host renderer.
	pub fn template(&self) -> &'static str {
		match self {
			View::EnterEmail(_) => TEMPLATE_ENTER_EMAIL,
			View::SelectGroup(_) => TEMPLATE_SELECT_GROUP,
			View::Configure => TEMPLATE_CONFIGURE,
		}
	}

	/// Template context as JSON.
	pub fn context(&self) -> Result<serde_json::Value> {
		serde_json::to_value(self).map_err(|err| crate::error::ConfigError::from(err).into())
	}

	/// Validation errors carried by the form, if any.
	pub fn errors(&self) -> Option<&FormErrors> {
		match self {
			View::EnterEmail(form) => Some(&form.errors),
			View::SelectGroup(form) => Some(&form.errors),
			View::Configure => None,
		}
	}
}

/// Email-entry form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmailForm {
	/// Previously submitted value, echoed back on re-render.
	pub email: String,
	/// Field errors from the last submission.
	pub errors: FormErrors,
}

/// Group-selection form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupForm {
	/// Groups the administrator may choose from.
	pub choices: Vec<GroupChoice>,
	/// Previously submitted group id, echoed back on re-render.
	pub selected: Option<String>,
	/// Field errors from the last submission.
	pub errors: FormErrors,
}

/// One `<option>` of the group-selection form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupChoice {
	/// Submitted value.
	pub id: String,
	/// Label shown to the administrator.
	pub name: String,
}
impl From<&RemoteGroup> for GroupChoice {
	fn from(group: &RemoteGroup) -> Self {
		Self { id: group.id.to_string(), name: group.name.clone() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::RemoteId;

	#[test]
	fn views_name_their_templates() {
		assert_eq!(View::EnterEmail(EmailForm::default()).template(), TEMPLATE_ENTER_EMAIL);
		assert_eq!(View::Configure.template(), "auth_gitlab/configure.html");
	}

	#[test]
	fn context_lists_group_choices() {
		let group = RemoteGroup { id: RemoteId::from(2), name: "B".into() };
		let view = View::SelectGroup(GroupForm {
			choices: vec![GroupChoice::from(&group)],
			..Default::default()
		});
		let context = view.context().expect("Context should serialize.");

		assert_eq!(context["view"], "select_group");
		assert_eq!(context["choices"][0]["id"], "2");
		assert_eq!(context["choices"][0]["name"], "B");
	}
}
