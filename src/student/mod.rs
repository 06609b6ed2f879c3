//! Student record model and field-level validation.
//!
//! [`StudentInput`] is what clients send; [`Student`] is what the store holds. Every field of the
//! input defaults to its zero value when absent, so an empty object decodes cleanly and is then
//! rejected by [`validate`] rather than by the JSON decoder.

use serde::{Deserialize, Serialize};

/// Inclusive upper bound accepted for [`Student::age`].
pub const MAX_AGE: i64 = 150;

/// Student record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier, immutable once assigned.
    pub id: u64,
    /// Display name (non-empty).
    pub name: String,
    /// Age in years, within `0..=150`.
    pub age: i64,
    /// Contact email (non-empty, format unchecked).
    pub email: String,
}

/// Candidate record decoded from a create or update request body.
///
/// Carries no `id` field: a client-supplied identifier is an unknown field to the decoder and is
/// dropped. The store always assigns identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentInput {
    /// Requested name.
    pub name: String,
    /// Requested age. Signed so negative values reach validation.
    pub age: i64,
    /// Requested email.
    pub email: String,
}

impl StudentInput {
    /// Materialize the candidate under a store-chosen identifier.
    pub fn into_student(self, id: u64) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
        }
    }
}

/// A single field violation reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human readable description of the violation.
    pub message: &'static str,
}

impl ValidationError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Check a candidate record, returning every violation in field order (`name`, `age`, `email`).
///
/// An empty vector means the candidate is valid. Checks never short-circuit.
pub fn validate(input: &StudentInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if input.name.is_empty() {
        errors.push(ValidationError::new("name", "Name is required"));
    }

    if !(0..=MAX_AGE).contains(&input.age) {
        errors.push(ValidationError::new("age", "Age must be between 0 and 150"));
    }

    if input.email.is_empty() {
        errors.push(ValidationError::new("email", "Email is required"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(name: &str, age: i64, email: &str) -> StudentInput {
        StudentInput {
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    #[test]
    fn valid_candidate_has_no_errors() {
        assert!(validate(&input("Ada", 30, "a@x.com")).is_empty());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(validate(&input("Ada", 0, "a@x.com")).is_empty());
        assert!(validate(&input("Ada", 150, "a@x.com")).is_empty());

        let low = validate(&input("Ada", -1, "a@x.com"));
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].field, "age");

        let high = validate(&input("Ada", 151, "a@x.com"));
        assert_eq!(high, vec![ValidationError::new("age", "Age must be between 0 and 150")]);
    }

    #[test]
    fn failures_accumulate_in_field_order() {
        let errors = validate(&input("", 200, ""));
        let fields: Vec<_> = errors.iter().map(|error| error.field).collect();
        assert_eq!(fields, vec!["name", "age", "email"]);
        assert_eq!(errors[0].message, "Name is required");
        assert_eq!(errors[2].message, "Email is required");
    }

    #[test]
    fn input_field_order_does_not_change_errors() {
        let candidate: StudentInput =
            serde_json::from_value(json!({ "email": "", "age": 200, "name": "" }))
                .expect("decode");
        assert_eq!(validate(&candidate).len(), 3);
    }

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let candidate: StudentInput = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(candidate, StudentInput::default());

        let fields: Vec<_> = validate(&candidate).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn wrong_field_type_fails_decoding() {
        let decoded = serde_json::from_value::<StudentInput>(json!({ "age": "thirty" }));
        assert!(decoded.is_err());
    }

    #[test]
    fn embedded_id_is_ignored() {
        let candidate: StudentInput = serde_json::from_value(
            json!({ "id": 99, "name": "Ada", "age": 30, "email": "a@x.com" }),
        )
        .expect("decode");
        let student = candidate.into_student(7);
        assert_eq!(student.id, 7);
        assert_eq!(student.name, "Ada");
    }

    #[test]
    fn student_serializes_to_wire_shape() {
        let student = input("Ada", 30, "a@x.com").into_student(1);
        assert_eq!(
            serde_json::to_value(&student).expect("encode"),
            json!({ "id": 1, "name": "Ada", "age": 30, "email": "a@x.com" })
        );
    }
}
