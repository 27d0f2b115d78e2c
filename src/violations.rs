use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A field-level problem with a submitted form. These are shown next to the
/// offending input and never leave the handler as an [`Error`](crate::error::Error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    FieldRequired {
        field: &'static str,
    },
    FieldTooLong {
        field: &'static str,
        maximum_length: usize,
        current_length: usize,
    },
    FieldMalformed {
        field: &'static str,
    },
    EmailAlreadyRegistered {
        field: &'static str,
    },
    CredentialsRejected,
}

impl Violation {
    pub fn field(&self) -> &'static str {
        match self {
            Violation::FieldRequired { field } => field,
            Violation::FieldTooLong { field, .. } => field,
            Violation::FieldMalformed { field } => field,
            Violation::EmailAlreadyRegistered { field } => field,
            Violation::CredentialsRejected => "form",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Violation::FieldRequired { .. } => "must not be empty".to_string(),
            Violation::FieldTooLong { maximum_length, .. } => {
                format!("must be at most {} characters", maximum_length)
            }
            Violation::FieldMalformed { .. } => "is not valid".to_string(),
            Violation::EmailAlreadyRegistered { .. } => "is already registered".to_string(),
            Violation::CredentialsRejected => "the email or password is incorrect".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Violations {
        Violations(vec![])
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|violation| violation.field() == field)
    }

    /// Records a violation if `value` is blank or longer than `maximum_length`.
    pub fn require(&mut self, field: &'static str, value: &str, maximum_length: usize) {
        if value.trim().is_empty() {
            self.push(Violation::FieldRequired { field });
        } else {
            self.limit(field, value, maximum_length);
        }
    }

    /// Records a violation if `value` is longer than `maximum_length`.
    pub fn limit(&mut self, field: &'static str, value: &str, maximum_length: usize) {
        let current_length = value.chars().count();
        if current_length > maximum_length {
            self.push(Violation::FieldTooLong {
                field,
                maximum_length,
                current_length,
            });
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Violations {
        Violations(vec![violation])
    }
}

// serialized as `{ field: [message, ...] }` for the templates
impl Serialize for Violations {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut by_field: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for violation in &self.0 {
            by_field
                .entry(violation.field())
                .or_default()
                .push(violation.message());
        }

        by_field.serialize(serializer)
    }
}
