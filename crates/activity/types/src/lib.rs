//! Activity Domain Types
//!
//! An activity is a multi-step business case (B2B onboarding, a loyalty
//! point lifecycle) described up front by a **blueprint** and driven one
//! step at a time by per-step state machines.
//!
//! # Key Concepts
//!
//! - **ScenarioBlueprint**: The declarative shape of a process. Ordered
//!   stages, each with a set of steps, each with a fixed vocabulary of
//!   outcomes. Every outcome maps to exactly one directive.
//! - **ActionState**: The state machine every step instance runs through.
//!   Transitions are checked against an explicit table.
//! - **OutcomeDirective**: What the enclosing process should do once an
//!   outcome is recorded (advance, retry, spawn, complete, fail, escalate,
//!   hold).
//! - **DirectiveConflictPolicy**: Collapses the directives produced by one
//!   completion into the directives actually applied.
//! - **PendingCallback**: Correlates an in-flight vendor request with the
//!   step waiting for its result.
//! - **ActivityEvent**: What a case reports as it moves.
//!
//! # Design Principles
//!
//! 1. Blueprints are fixed before a case starts. The orchestrator reasons
//!    about a step from its outcome map, never from business logic.
//! 2. Illegal transitions fail loudly. Nothing is clamped.
//! 3. Conflict resolution is a per-scenario choice, not a global rule.
//! 4. Ambiguity is escalated, not thrown.

#![deny(unsafe_code)]

mod blueprint;
mod callback;
mod directive;
mod errors;
mod event;
mod ids;
mod lifecycle;
mod outcome;
mod policy;
mod signature;
mod state;

pub use blueprint::*;
pub use callback::*;
pub use directive::*;
pub use errors::*;
pub use event::*;
pub use ids::*;
pub use lifecycle::*;
pub use outcome::*;
pub use policy::*;
pub use signature::*;
pub use state::*;
