//! B2B Onboarding on the Activity Engine
//!
//! Enterprise and SME onboarding expressed as scenario blueprints, plus the
//! vendor side effects their steps need.
//!
//! # Key Concepts
//!
//! - **Scenarios**: `enterprise_onboarding` (KYC, contract, provisioning,
//!   activation; ambiguity escalates) and `sme_onboarding` (automated KYC,
//!   activation; terminal outcomes win).
//! - **Handlers**: KYC, e-signature and provisioning calls fired when their
//!   step starts. Vendor work is awaited through pending callbacks.
//! - **Webhooks**: vendor status vocabularies mapped onto outcome codes.

#![deny(unsafe_code)]

mod bootstrap;
mod escalation;
mod handlers;
mod scenarios;
mod vendors;
mod webhook;

pub use bootstrap::*;
pub use escalation::*;
pub use handlers::*;
pub use scenarios::*;
pub use vendors::*;
pub use webhook::*;
