//! New-todo form: draft fields, validation and submission.
//!
//! # Design
//! The form is a small state machine. It sits in *editing* until `submit`
//! runs, validates, and either returns to editing with per-field errors or
//! hands the payload to the caller's save operation. Once the save returns the
//! form is back in editing: cleared on success, untouched on failure so the
//! user can retry without retyping.
//!
//! `is_submittable` is the button gate and needs no prior `validate` call.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::types::NewTodo;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Description,
    DueDate,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Description, Field::DueDate];

    /// Wire name, matching the JSON payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::DueDate => "due_date",
        }
    }

    /// Input limit in characters, if any.
    pub fn max_chars(self) -> Option<usize> {
        match self {
            Field::Title => Some(TITLE_MAX_CHARS),
            Field::Description => Some(DESCRIPTION_MAX_CHARS),
            Field::DueDate => None,
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Field::Title => "Title is required",
            Field::Description => "Description is required",
            Field::DueDate => "Due date is required",
        }
    }

    fn is_blank(self, value: &str) -> bool {
        match self {
            Field::Title | Field::Description => value.trim().is_empty(),
            // A date input yields either a date or nothing.
            Field::DueDate => value.is_empty(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown form field `{0}`")]
pub struct UnknownField(String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Unsaved form contents. No identity until the server assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl Draft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::DueDate => &self.due_date,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::DueDate => &mut self.due_date,
        }
    }

    /// Payload for the create call. Values are sent as typed.
    pub fn to_new_todo(&self) -> NewTodo {
        NewTodo {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date.clone(),
        }
    }
}

pub type FieldErrors = BTreeMap<Field, &'static str>;

/// Per-field messages for everything wrong with `draft`. Empty means valid.
pub fn check(draft: &Draft) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter(|field| field.is_blank(draft.get(*field)))
        .map(|field| (field, field.required_message()))
        .collect()
}

/// How a `submit` call ended.
#[derive(Debug)]
pub enum SubmitOutcome<R, E> {
    /// Validation failed; nothing was sent. See `TodoForm::errors`.
    Invalid,
    /// The save operation succeeded and the form was cleared.
    Saved(R),
    /// The save operation failed; the fields are retained.
    Failed(E),
}

impl<R, E> SubmitOutcome<R, E> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

#[derive(Debug, Default)]
pub struct TodoForm {
    draft: Draft,
    errors: FieldErrors,
    submitting: bool,
}

impl TodoForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Assign a field. Input past the field's limit is cut off, the way a
    /// length-limited text input behaves. No validation happens here.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let mut value = value.into();
        if let Some(max) = field.max_chars() {
            if let Some((cut, _)) = value.char_indices().nth(max) {
                value.truncate(cut);
            }
        }
        *self.draft.slot_mut(field) = value;
    }

    /// Characters used, for the "12/100 characters" counter.
    pub fn char_count(&self, field: Field) -> usize {
        self.draft.get(field).chars().count()
    }

    /// Recompute `errors` from the draft and report whether it is valid.
    pub fn validate(&mut self) -> bool {
        self.errors = check(&self.draft);
        self.errors.is_empty()
    }

    pub fn is_submittable(&self) -> bool {
        Field::ALL
            .into_iter()
            .all(|field| !field.is_blank(self.draft.get(field)))
    }

    /// Validate and, if valid, pass the payload to `save`.
    ///
    /// On success the draft and errors are cleared. On failure the draft is
    /// kept as typed. `submitting` is set only while `save` runs.
    pub async fn submit<F, Fut, R, E>(&mut self, save: F) -> SubmitOutcome<R, E>
    where
        F: FnOnce(NewTodo) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        if !self.validate() {
            debug!(invalid = ?self.errors.keys().collect::<Vec<_>>(), "draft rejected");
            return SubmitOutcome::Invalid;
        }

        self.submitting = true;
        let result = save(self.draft.to_new_todo()).await;
        self.submitting = false;

        match result {
            Ok(saved) => {
                self.reset();
                SubmitOutcome::Saved(saved)
            }
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    /// Back to a blank draft with no errors.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn filled(title: &str, description: &str, due_date: &str) -> TodoForm {
        let mut form = TodoForm::new();
        form.set_field(Field::Title, title);
        form.set_field(Field::Description, description);
        form.set_field(Field::DueDate, due_date);
        form
    }

    #[test]
    fn empty_form_reports_every_field() {
        let mut form = TodoForm::new();
        assert!(!form.validate());
        assert_eq!(form.error(Field::Title), Some("Title is required"));
        assert_eq!(form.error(Field::Description), Some("Description is required"));
        assert_eq!(form.error(Field::DueDate), Some("Due date is required"));
        assert!(!form.is_submittable());
    }

    #[test]
    fn whitespace_only_text_is_blank() {
        let mut form = filled("   ", "\t\n", "2024-01-01");
        assert!(!form.is_submittable());
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 2);
        assert!(form.error(Field::DueDate).is_none());
    }

    #[test]
    fn set_field_does_not_validate() {
        let mut form = TodoForm::new();
        form.validate();
        form.set_field(Field::Title, "fixed");
        // Stale until the next validate.
        assert_eq!(form.error(Field::Title), Some("Title is required"));
        form.validate();
        assert_eq!(form.error(Field::Title), None);
    }

    #[test]
    fn submittable_without_running_validate() {
        let form = filled("Buy milk", "2%", "2024-05-01");
        assert!(form.is_submittable());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn long_input_is_cut_at_the_limit() {
        let mut form = TodoForm::new();
        form.set_field(Field::Title, "é".repeat(150));
        form.set_field(Field::Description, "x".repeat(501));
        form.set_field(Field::DueDate, "2024-05-01");
        assert_eq!(form.char_count(Field::Title), TITLE_MAX_CHARS);
        assert_eq!(form.char_count(Field::Description), DESCRIPTION_MAX_CHARS);
        assert_eq!(form.draft().due_date, "2024-05-01");
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert_eq!("dueDate".parse::<Field>(), Err(UnknownField("dueDate".to_string())));
    }

    #[tokio::test]
    async fn missing_title_blocks_submission() {
        let mut form = filled("", "x", "2024-01-01");
        let called = Cell::new(false);
        let called = &called;

        let outcome = form
            .submit(move |_| async move {
                called.set(true);
                Ok::<_, ()>(())
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert!(!called.get());
        assert!(!form.is_submittable());
        let expected: FieldErrors = [(Field::Title, "Title is required")].into_iter().collect();
        assert_eq!(form.errors(), &expected);
        assert_eq!(form.draft().description, "x");
    }

    #[tokio::test]
    async fn successful_save_clears_the_form() {
        let mut form = filled("Buy milk", "2%", "2024-05-01");
        let mut sent = None;

        let outcome = form
            .submit(|todo| {
                sent = Some(todo);
                async { Ok::<_, ()>(7) }
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Saved(7)));
        assert_eq!(
            sent,
            Some(NewTodo {
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
                due_date: "2024-05-01".to_string(),
            })
        );
        assert_eq!(form.draft(), &Draft::default());
        assert!(form.errors().is_empty());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn failed_save_keeps_fields() {
        let mut form = filled("Buy milk", "2%", "2024-05-01");

        let outcome = form.submit(|_| async { Err::<(), _>("server down") }).await;

        assert!(matches!(outcome, SubmitOutcome::Failed("server down")));
        assert_eq!(form.draft().title, "Buy milk");
        assert_eq!(form.draft().due_date, "2024-05-01");
        assert!(!form.is_submitting());
        assert!(form.is_submittable());
    }

    #[tokio::test]
    async fn errors_clear_after_a_corrected_submission() {
        let mut form = filled("", "", "");
        form.submit(|_| async { Ok::<_, ()>(()) }).await;
        assert_eq!(form.errors().len(), 3);

        form.set_field(Field::Title, "a");
        form.set_field(Field::Description, "b");
        form.set_field(Field::DueDate, "2024-02-02");
        assert!(form.submit(|_| async { Ok::<_, ()>(()) }).await.is_saved());
        assert!(form.errors().is_empty());
    }
}
