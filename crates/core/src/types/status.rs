//! Coupon approval status.

use serde::{Deserialize, Serialize};

/// Where a coupon sits in the approval lifecycle.
///
/// ```text
/// Pending --approve--> Approved --disapprove--> Pending
/// ```
///
/// Both states leave the lifecycle through a hard delete; there is no
/// tombstone state because the document is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Submitted but hidden from the public catalog.
    #[default]
    Pending,
    /// Visible on the public catalog.
    Approved,
}

impl ApprovalStatus {
    /// Status for a stored `approved` flag.
    #[must_use]
    pub const fn from_approved(approved: bool) -> Self {
        if approved {
            Self::Approved
        } else {
            Self::Pending
        }
    }

    /// The stored `approved` flag for this status.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending Approval"),
            Self::Approved => write!(f, "Approved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_mapping() {
        assert_eq!(ApprovalStatus::from_approved(true), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from_approved(false), ApprovalStatus::Pending);
        assert!(ApprovalStatus::Approved.is_approved());
        assert!(!ApprovalStatus::Pending.is_approved());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(ApprovalStatus::Pending.to_string(), "Pending Approval");
        assert_eq!(ApprovalStatus::Approved.to_string(), "Approved");
    }
}
