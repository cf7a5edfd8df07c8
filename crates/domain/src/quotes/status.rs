use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Quote workflow status. Moves forward only.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Submitted by staff, waiting for a cost estimate
    Pending,
    /// Response attached
    Estimated,
    Approved,
    Rejected,
}

impl Default for QuoteStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Estimated => "estimated",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validate `self -> to`, returning the new status.
    pub fn transition(self, to: QuoteStatus) -> Result<QuoteStatus, Error> {
        use QuoteStatus::*;
        match (self, to) {
            (Pending, Estimated) | (Estimated, Approved) | (Estimated, Rejected) => Ok(to),
            _ => Err(Error::invalid_transition(self, to)),
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient-facing report status.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Declined,
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }

    pub fn transition(self, to: ReportStatus) -> Result<ReportStatus, Error> {
        use ReportStatus::*;
        match (self, to) {
            (Draft, Sent) | (Sent, Viewed) => Ok(to),
            (from, Accepted | Declined) if !from.is_terminal() => Ok(to),
            _ => Err(Error::invalid_transition(self, to)),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
