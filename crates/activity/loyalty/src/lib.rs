//! Loyalty Incentives
//!
//! A member activity (a purchase, a referral, a review) recorded against an
//! active [`LoyaltyCampaign`] becomes an incentive that is evaluated,
//! settled into journal entries and rewards, and may later be reversed on a
//! chargeback. [`LoyaltyProcessManager`] drives that flow and releases the
//! resulting [`LoyaltyEvent`]s.
//!
//! The incentive machine is its own [`IncentiveState`] table, not the
//! action state machine, and campaigns run a third one, [`CampaignStatus`].
//! All of them answer the same
//! [`LifecycleState`](activity_types::LifecycleState) questions, so code
//! that inspects machines generically treats them alike.

#![deny(unsafe_code)]

mod action;
mod campaign;
mod decision;
mod error;
mod events;
mod points;
mod process;
mod state;

pub use action::*;
pub use campaign::*;
pub use decision::*;
pub use error::*;
pub use events::*;
pub use points::*;
pub use process::*;
pub use state::*;
