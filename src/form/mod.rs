//! Client-side form state machines
//!
//! Forms hold drafts, validate them before any service call, and only reset
//! once the backing store has confirmed the write.

pub mod test_case_detail;
pub mod test_case_form;
pub mod ticket_edit;
pub mod ticket_wizard;

use std::collections::BTreeMap;
use std::fmt;

pub use test_case_detail::{DetailMode, TestCaseDetail};
pub use test_case_form::{TestCaseForm, parse_tags};
pub use ticket_edit::TicketEditForm;
pub use ticket_wizard::{SubmitState, TicketWizard, WizardStep};

/// Per-field validation messages keyed by the field's wire name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// `Ok(())` when empty, otherwise a validation error carrying these messages
    pub fn into_result(self) -> crate::error::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::error::BugHiveError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

/// Record `message` under `field` when `value` is blank after trimming
pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_treats_whitespace_as_blank() {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", "   ", "Title is required");
        require(&mut errors, "description", "ok", "Description is required");
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert!(!errors.contains("description"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_display_joins_in_field_order() {
        let mut errors = FieldErrors::default();
        errors.insert("title", "Title is required");
        errors.insert("description", "Description is required");
        assert_eq!(
            errors.to_string(),
            "description: Description is required; title: Title is required"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::default().into_result().is_ok());
        let mut errors = FieldErrors::default();
        errors.insert("title", "Title is required");
        let err = errors.into_result().unwrap_err();
        assert!(err.field_errors().is_some());
    }
}
