use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle state of a form. The only transition is Draft to Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Draft,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    NormalUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// A decision recorded against a response. Pending is not a decision; it is
/// the absence of one (see [`ApprovalState`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    Rejected,
}

/// Approval state as seen by readers, derived from the optional approval row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalState {
    #[must_use]
    pub fn derive(decision: Option<DecisionStatus>) -> Self {
        match decision {
            None => Self::Pending,
            Some(DecisionStatus::Approved) => Self::Approved,
            Some(DecisionStatus::Rejected) => Self::Rejected,
        }
    }
}

/// Whether a user has answered an assigned form. Existence based: any number
/// of responses above zero counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Complete,
}

impl SubmissionStatus {
    #[must_use]
    pub fn derive(response_count: i64) -> Self {
        if response_count > 0 {
            Self::Complete
        } else {
            Self::Pending
        }
    }
}

macro_rules! string_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(Error::InvalidArgument(format!("unknown {}: {s}", $what)))
            }
        }
    };
}

string_enum!(FormStatus, "form status", { Draft => "draft", Active => "active" });
string_enum!(Role, "role", { Admin => "admin", NormalUser => "normal_user" });
string_enum!(UserStatus, "user status", { Active => "active", Inactive => "inactive" });
string_enum!(DecisionStatus, "approval status", { Approved => "approved", Rejected => "rejected" });
string_enum!(ApprovalState, "approval state", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});
string_enum!(SubmissionStatus, "submission status", { Pending => "pending", Complete => "complete" });
