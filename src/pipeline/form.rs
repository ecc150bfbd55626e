//! Field-level validation errors rendered back into re-displayed forms.

// crates.io
use validator::ValidationErrors;
// self
use crate::_prelude::*;

/// Message used when a required field is blank.
pub const MSG_REQUIRED: &str = "This field is required.";

/// Validation errors keyed by form field.
///
/// Invalid input never aborts a pipeline; the step re-renders its view with these messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);
impl FormErrors {
	/// Adds a message for `field`.
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	/// Messages recorded for `field`.
	pub fn get(&self, field: &str) -> &[String] {
		self.0.get(field).map(Vec::as_slice).unwrap_or_default()
	}

	/// Returns `true` when no field has errors.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over fields with errors in field order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.0.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
	}
}
impl From<ValidationErrors> for FormErrors {
	fn from(errors: ValidationErrors) -> Self {
		let mut form_errors = FormErrors::default();

		for (field, field_errors) in errors.field_errors() {
			for error in field_errors.iter() {
				let message = match &error.message {
					Some(message) => message.to_string(),
					None => error.code.to_string(),
				};

				form_errors.add(field.to_string(), message);
			}
		}

		form_errors
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use validator::ValidationError;
	// self
	use super::*;

	#[test]
	fn converts_validator_messages() {
		let mut errors = ValidationErrors::new();
		let mut invalid = ValidationError::new("email");

		invalid.message = Some("Enter a valid email address.".into());
		errors.add("email", invalid);

		let form_errors = FormErrors::from(errors);

		assert_eq!(form_errors.get("email"), ["Enter a valid email address.".to_owned()]);
		assert!(form_errors.get("group").is_empty());
	}

	#[test]
	fn serializes_as_field_map() {
		let mut errors = FormErrors::default();

		errors.add("group", MSG_REQUIRED);

		assert_eq!(
			serde_json::to_value(&errors).expect("Errors should serialize."),
			serde_json::json!({ "group": [MSG_REQUIRED] })
		);
	}
}
