//! Declarative field validation.
//!
//! A [`Schema`] is an ordered list of field rules. Evaluating it collects every
//! violation instead of stopping at the first one, so callers can report all of
//! them next to the offending fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const REQUIRED: &str = "required";

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            reason: reason.into(),
        });
    }

    /// Merge violations from a nested value, prefixing their field paths.
    pub fn extend_nested(&mut self, prefix: &str, nested: Violations) {
        for error in nested.0 {
            self.push(join_path(prefix, &error.field), error.reason);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

type Check<T> = Box<dyn Fn(&T, &mut Violations) + Send + Sync>;

/// Field → validator table for `T`.
pub struct Schema<T> {
    checks: Vec<Check<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule that may report any number of fields.
    pub fn check(
        mut self,
        check: impl Fn(&T, &mut Violations) + Send + Sync + 'static,
    ) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Free-form rule: the closure returns a reason when the value is invalid.
    pub fn rule(
        self,
        field: &'static str,
        check: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.check(move |value, violations| {
            if let Some(reason) = check(value) {
                violations.push(field, reason);
            }
        })
    }

    pub fn required(self, field: &'static str, get: fn(&T) -> &str) -> Self {
        self.rule(field, move |value| {
            get(value).trim().is_empty().then(|| REQUIRED.to_string())
        })
    }

    pub fn email(self, field: &'static str, get: fn(&T) -> &str) -> Self {
        self.rule(field, move |value| {
            let email = get(value).trim();
            if email.is_empty() {
                Some(REQUIRED.to_string())
            } else if !is_valid_email(email) {
                Some("must be a valid email address".to_string())
            } else {
                None
            }
        })
    }

    pub fn min(self, field: &'static str, min: f64, get: fn(&T) -> f64) -> Self {
        self.rule(field, move |value| {
            let n = get(value);
            if !n.is_finite() {
                Some("must be a finite number".to_string())
            } else if n < min {
                Some(format!("must be at least {}", min))
            } else {
                None
            }
        })
    }

    pub fn non_negative(self, field: &'static str, get: fn(&T) -> f64) -> Self {
        self.rule(field, move |value| {
            let n = get(value);
            if !n.is_finite() {
                Some("must be a finite number".to_string())
            } else if n < 0.0 {
                Some("must not be negative".to_string())
            } else {
                None
            }
        })
    }

    pub fn nested<U: 'static>(
        mut self,
        prefix: &'static str,
        schema: Schema<U>,
        get: fn(&T) -> &U,
    ) -> Self {
        self.checks.push(Box::new(move |value, violations| {
            violations.extend_nested(prefix, schema.evaluate(get(value)));
        }));
        self
    }

    /// Apply `schema` to every element, with paths like `materials[1].quantity`.
    pub fn each<U: 'static>(
        mut self,
        prefix: &'static str,
        schema: Schema<U>,
        get: fn(&T) -> &[U],
    ) -> Self {
        self.checks.push(Box::new(move |value, violations| {
            for (i, item) in get(value).iter().enumerate() {
                let path = format!("{}[{}]", prefix, i);
                violations.extend_nested(&path, schema.evaluate(item));
            }
        }));
        self
    }

    pub fn evaluate(&self, value: &T) -> Violations {
        let mut violations = Violations::default();
        for check in &self.checks {
            check(value, &mut violations);
        }
        violations
    }

    pub fn validate(&self, value: &T) -> Result<(), Error> {
        self.evaluate(value).into_result()
    }
}

/// Same shape as `local@domain.tld` with a two-letter-or-longer TLD.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let domain_ok = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };
    local_ok && domain_ok && tld_ok
}
