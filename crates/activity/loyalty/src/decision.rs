//! Settlement decisions and the effects they carry

use serde::{Deserialize, Serialize};

/// Points booked to (or taken from) a member account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub account_id: String,
    pub points: i64,
    pub description: String,
}

impl JournalEntry {
    pub fn new(account_id: impl Into<String>, points: i64, description: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            points,
            description: description.into(),
        }
    }

    pub fn is_credit(&self) -> bool {
        self.points > 0
    }

    /// The entry that cancels this one
    pub fn reversal(&self, reason: &str) -> Self {
        Self::new(
            self.account_id.clone(),
            -self.points,
            format!("Reversal: {reason}"),
        )
    }
}

/// A non-points reward handed to a member
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub reward_id: String,
    pub member_id: String,
    pub description: String,
}

impl RewardGrant {
    pub fn new(
        reward_id: impl Into<String>,
        member_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            reward_id: reward_id.into(),
            member_id: member_id.into(),
            description: description.into(),
        }
    }
}

/// What settling an incentive books
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveDecision {
    pub description: String,
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default)]
    pub reward_grants: Vec<RewardGrant>,
}

impl IncentiveDecision {
    pub const POINTS_GRANTED: &str = "points_granted";
    pub const REWARD_GRANTED: &str = "reward_granted";

    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// A plain points credit for one member
    pub fn points(member_id: impl Into<String>, points: i64, description: impl Into<String>) -> Self {
        let description = description.into();
        Self::new(description.clone()).with_entry(JournalEntry::new(member_id, points, description))
    }

    pub fn with_entry(mut self, entry: JournalEntry) -> Self {
        self.journal_entries.push(entry);
        self
    }

    pub fn with_reward(mut self, grant: RewardGrant) -> Self {
        self.reward_grants.push(grant);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.journal_entries.is_empty() && self.reward_grants.is_empty()
    }

    pub fn total_points(&self) -> i64 {
        self.journal_entries.iter().map(|e| e.points).sum()
    }

    /// Outcome code recorded when the decision settles
    pub fn outcome_code(&self) -> &'static str {
        if self.journal_entries.is_empty() {
            Self::REWARD_GRANTED
        } else {
            Self::POINTS_GRANTED
        }
    }
}
