use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Who is calling. Medical staff and patients see different operations.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Session {
    Medical { user_id: String },
    Patient { user_id: String },
}

impl Session {
    /// Build a session from the caller's claimed role and user id.
    ///
    /// Credentials are not checked; a missing or unknown role is still an
    /// authentication failure.
    pub fn authenticate(role: Option<&str>, user_id: Option<&str>) -> Result<Self, Error> {
        let user_id = match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(Error::Authentication {
                    reason: "missing user id".to_string(),
                })
            }
        };

        match role.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("medical") => Ok(Session::Medical { user_id }),
            Some("patient") => Ok(Session::Patient { user_id }),
            Some(other) => Err(Error::Authentication {
                reason: format!("unknown role '{}'", other),
            }),
            None => Err(Error::Authentication {
                reason: "missing role".to_string(),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Session::Medical { user_id } | Session::Patient { user_id } => user_id,
        }
    }

    pub fn is_medical(&self) -> bool {
        matches!(self, Session::Medical { .. })
    }

    /// Staff-only operations.
    pub fn require_medical(&self) -> Result<&str, Error> {
        match self {
            Session::Medical { user_id } => Ok(user_id),
            Session::Patient { .. } => Err(Error::Forbidden),
        }
    }

    /// Staff may touch any quote; patients only their own.
    pub fn require_access(&self, patient_id: Option<&str>) -> Result<(), Error> {
        match self {
            Session::Medical { .. } => Ok(()),
            Session::Patient { user_id } if patient_id == Some(user_id.as_str()) => Ok(()),
            Session::Patient { .. } => Err(Error::Forbidden),
        }
    }
}
