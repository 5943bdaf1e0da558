//! Loyalty campaign: the season incentives are earned in
//!
//! A campaign owns the activity categories members can earn in and keeps a
//! log of every activity recorded against it. It has its own small state
//! machine, a second [`LifecycleState`] table next to the incentive one.

use crate::{ActivityCategory, IncentiveError, IncentiveResult};
use activity_types::LifecycleState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Campaign Status ──────────────────────────────────────────────────

/// ```text
/// Draft → Active ⇄ Suspended
///           ↓         ↓
///         Completed ←─┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Suspended,
    Completed,
}

impl LifecycleState for CampaignStatus {
    const ALL: &'static [Self] = &[Self::Draft, Self::Active, Self::Suspended, Self::Completed];

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Active],
            Self::Active => &[Self::Suspended, Self::Completed],
            Self::Suspended => &[Self::Active, Self::Completed],
            Self::Completed => &[],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Activity Log ─────────────────────────────────────────────────────

/// One member activity recorded against a campaign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedActivity {
    pub id: String,
    pub member_id: String,
    pub category: ActivityCategory,
    pub event_type: String,
    pub incentive_id: String,
    pub settled: bool,
    pub occurred_at: DateTime<Utc>,
}

// ── Campaign ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyCampaign {
    id: String,
    name: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    status: CampaignStatus,
    categories: Vec<ActivityCategory>,
    activities: Vec<RecordedActivity>,
}

impl LoyaltyCampaign {
    /// A Draft campaign with no categories
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            starts_at,
            ends_at,
            status: CampaignStatus::Draft,
            categories: Vec::new(),
            activities: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: ActivityCategory) -> Self {
        self.add_category(category);
        self
    }

    pub fn add_category(&mut self, category: ActivityCategory) {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
    }

    fn transition_to(&mut self, target: CampaignStatus) -> IncentiveResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(IncentiveError::InvalidCampaignTransition {
                from: self.status,
                to: target,
            });
        }
        tracing::info!(campaign = %self.id, from = %self.status, to = %target, "Campaign transition");
        self.status = target;
        Ok(())
    }

    /// Draft or Suspended to Active
    pub fn activate(&mut self) -> IncentiveResult<()> {
        self.transition_to(CampaignStatus::Active)
    }

    pub fn suspend(&mut self) -> IncentiveResult<()> {
        self.transition_to(CampaignStatus::Suspended)
    }

    pub fn complete(&mut self) -> IncentiveResult<()> {
        self.transition_to(CampaignStatus::Completed)
    }

    pub(crate) fn record(&mut self, activity: RecordedActivity) {
        self.activities.push(activity);
    }

    pub(crate) fn mark_settled(&mut self, incentive_id: &str) -> IncentiveResult<()> {
        let activity = self
            .activities
            .iter_mut()
            .find(|a| a.incentive_id == incentive_id)
            .ok_or_else(|| IncentiveError::UnknownIncentive {
                campaign_id: self.id.clone(),
                incentive_id: incentive_id.to_string(),
            })?;
        activity.settled = true;
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    pub fn categories(&self) -> &[ActivityCategory] {
        &self.categories
    }

    pub fn has_category(&self, category: ActivityCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn activities(&self) -> &[RecordedActivity] {
        &self.activities
    }

    pub fn activities_in(&self, category: ActivityCategory) -> impl Iterator<Item = &RecordedActivity> {
        self.activities.iter().filter(move |a| a.category == category)
    }

    pub fn find_activity(&self, incentive_id: &str) -> Option<&RecordedActivity> {
        self.activities.iter().find(|a| a.incentive_id == incentive_id)
    }

    /// Settled incentives in a category; a later reversal does not uncount one
    pub fn settled_incentives(&self, category: ActivityCategory) -> usize {
        self.activities_in(category).filter(|a| a.settled).count()
    }
}
