//! Submitted forms and their validation. Every form is deserialized with all
//! fields optional so that a missing field becomes a validation error rather
//! than a rejected request.

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::NewComment;

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    errors: Vec<FieldError>,
}

impl FormErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=&FieldError> {
        self.errors.iter()
    }

    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors.iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// How a form field is checked once `validator` has run.
struct FieldSpec<'a> {
    name: &'static str,
    value: &'a Option<String>,
    required: bool,
    max_length: Option<usize>,
}

/// Trimmed value, blank counts as absent.
fn cleaned(value: &Option<String>) -> Option<String> {
    value.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn message(error: &ValidationError, spec: &FieldSpec) -> String {
    match &*error.code {
        "email" => INVALID_EMAIL.to_string(),
        "length" => {
            let len = spec.value.as_deref().map_or(0, |v| v.chars().count());
            format!("Ensure this value has at most {} characters (it has {}).",
                    spec.max_length.unwrap_or(len), len)
        }
        _ => error.to_string(),
    }
}

/// Errors in field declaration order: a missing required field reports only
/// that, a present one reports what `validator` found.
fn collect_errors(fields: &[FieldSpec], validation: Result<(), ValidationErrors>) -> FormErrors {
    let invalid = match validation {
        Ok(()) => ValidationErrors::new(),
        Err(e) => e,
    };
    let field_errors = invalid.field_errors();

    let mut errors = FormErrors::default();
    for spec in fields {
        if spec.value.is_none() {
            if spec.required {
                errors.add(spec.name, REQUIRED);
            }
            continue;
        }
        let found = field_errors.iter()
            .filter(|(field, _)| field.to_string() == spec.name)
            .flat_map(|(_, errs)| errs.iter());
        for error in found {
            errors.add(spec.name, message(error, spec));
        }
    }
    errors
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(max = 80))]
    pub name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    pub body: Option<String>,
}

impl CommentForm {
    pub fn clean(&self) -> Result<NewComment, FormErrors> {
        let form = CommentForm {
            name: cleaned(&self.name),
            email: cleaned(&self.email),
            body: cleaned(&self.body),
        };

        let errors = collect_errors(&[
            FieldSpec { name: "name", value: &form.name, required: true, max_length: Some(80) },
            FieldSpec { name: "email", value: &form.email, required: true, max_length: Some(254) },
            FieldSpec { name: "body", value: &form.body, required: true, max_length: None },
        ], form.validate());

        match (form.name, form.email, form.body) {
            (Some(name), Some(email), Some(body)) if errors.is_empty() => Ok(NewComment { name, email, body }),
            _ => Err(errors),
        }
    }
}

/// Cleaned share-by-email submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EmailPostForm {
    #[validate(length(max = 25))]
    pub name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(email, length(max = 254))]
    pub to: Option<String>,
    pub comments: Option<String>,
}

impl EmailPostForm {
    pub fn clean(&self) -> Result<ShareRequest, FormErrors> {
        let form = EmailPostForm {
            name: cleaned(&self.name),
            email: cleaned(&self.email),
            to: cleaned(&self.to),
            comments: cleaned(&self.comments),
        };

        let errors = collect_errors(&[
            FieldSpec { name: "name", value: &form.name, required: true, max_length: Some(25) },
            FieldSpec { name: "email", value: &form.email, required: true, max_length: Some(254) },
            FieldSpec { name: "to", value: &form.to, required: true, max_length: Some(254) },
            FieldSpec { name: "comments", value: &form.comments, required: false, max_length: None },
        ], form.validate());

        match (form.name, form.email, form.to) {
            (Some(name), Some(email), Some(to)) if errors.is_empty() => Ok(ShareRequest {
                name,
                email,
                to,
                comments: form.comments.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchForm {
    pub query: Option<String>,
}

impl SearchForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let form = SearchForm { query: cleaned(&self.query) };
        let errors = collect_errors(&[
            FieldSpec { name: "query", value: &form.query, required: true, max_length: None },
        ], form.validate());

        match form.query {
            Some(query) if errors.is_empty() => Ok(query),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_valid_comment() {
        let form = CommentForm { name: some(" Ana "), email: some("ana@example.com"), body: some("Nice post") };
        let comment = form.clean().unwrap();
        assert_eq!(comment, NewComment {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            body: "Nice post".to_string(),
        });
    }

    #[test]
    fn test_comment_missing_body() {
        let form = CommentForm { name: some("Ana"), email: some("ana@example.com"), body: some("   ") };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.for_field("body"), vec![REQUIRED]);
        assert!(errors.for_field("name").is_empty());
    }

    #[test]
    fn test_comment_all_missing() {
        let errors = CommentForm::default().clean().unwrap_err();
        assert_eq!(errors.iter().count(), 3);
    }

    #[test]
    fn test_comment_name_too_long() {
        let form = CommentForm { name: Some("x".repeat(81)), email: some("a@b.io"), body: some("b") };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.for_field("name"), vec!["Ensure this value has at most 80 characters (it has 81)."]);
    }

    fn email_errors(email: &str) -> Vec<String> {
        let form = CommentForm { name: some("Ana"), email: some(email), body: some("b") };
        match form.clean() {
            Ok(_) => vec![],
            Err(errors) => errors.for_field("email").into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(email_errors("someone@example.com").is_empty());
        assert!(email_errors("first.last+tag@sub.example.org").is_empty());
        assert!(email_errors(" padded@example.com ").is_empty());
        assert!(email_errors("ana@exämple.com").is_empty());
        assert_eq!(email_errors("someone"), vec![INVALID_EMAIL]);
        assert_eq!(email_errors("someone@"), vec![INVALID_EMAIL]);
        assert_eq!(email_errors("some one@example.com"), vec![INVALID_EMAIL]);
    }

    #[test]
    fn test_errors_in_field_order() {
        let form = CommentForm { name: Some("x".repeat(81)), email: some("nope"), body: None };
        let errors = form.clean().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "body"]);
    }

    #[test]
    fn test_share_form() {
        let form = EmailPostForm { name: some("Ana"), email: some("ana@example.com"), to: some("bob@example.com"), comments: None };
        let share = form.clean().unwrap();
        assert_eq!(share.to, "bob@example.com");
        assert_eq!(share.comments, "");

        let form = EmailPostForm { name: some("Ana"), email: some("ana@example.com"), to: some("not-an-email"), comments: None };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.for_field("to"), vec![INVALID_EMAIL]);
    }

    #[test]
    fn test_search_form() {
        assert_eq!(SearchForm { query: some(" django ") }.clean(), Ok("django".to_string()));
        assert!(SearchForm { query: some("") }.clean().is_err());
        assert!(SearchForm { query: None }.clean().is_err());
    }
}
