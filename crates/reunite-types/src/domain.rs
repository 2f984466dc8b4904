//! Shared status vocabulary and reward constants.
//!
//! Statuses are persisted as lowercase strings; the enums here exist so the
//! rest of the workspace writes and compares them without stringly typos.

use serde::{Deserialize, Serialize};

// -- Reward points --

/// Points granted for reporting a lost item.
pub const POINTS_REPORT_LOST: i64 = 10;
/// Points granted for reporting a found item.
pub const POINTS_REPORT_FOUND: i64 = 15;
/// Points granted to the finder when a claim is approved.
pub const POINTS_RETURNED_ITEM: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LostItemStatus {
    Active,
    Found,
    Closed,
}

impl LostItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LostItemStatus::Active => "active",
            LostItemStatus::Found => "found",
            LostItemStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "found" => Some(Self::Found),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoundItemStatus {
    Available,
    Claimed,
    Returned,
}

impl FoundItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FoundItemStatus::Available => "available",
            FoundItemStatus::Claimed => "claimed",
            FoundItemStatus::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "claimed" => Some(Self::Claimed),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Viewed,
    Dismissed,
    Claimed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Viewed => "viewed",
            MatchStatus::Dismissed => "dismissed",
            MatchStatus::Claimed => "claimed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "viewed" => Some(Self::Viewed),
            "dismissed" => Some(Self::Dismissed),
            "claimed" => Some(Self::Claimed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for s in [
            LostItemStatus::Active,
            LostItemStatus::Found,
            LostItemStatus::Closed,
        ] {
            assert_eq!(LostItemStatus::parse(s.as_str()), Some(s));
        }
        for s in [
            FoundItemStatus::Available,
            FoundItemStatus::Claimed,
            FoundItemStatus::Returned,
        ] {
            assert_eq!(FoundItemStatus::parse(s.as_str()), Some(s));
        }
        for s in [
            ClaimStatus::Pending,
            ClaimStatus::Approved,
            ClaimStatus::Rejected,
            ClaimStatus::Completed,
        ] {
            assert_eq!(ClaimStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(MatchStatus::parse("archived"), None);
        assert_eq!(VerificationStatus::parse(""), None);
    }
}
