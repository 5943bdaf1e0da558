//! Activity Engine
//!
//! Drives cases built from scenario blueprints. A case moves one step at a
//! time: starting a step runs its lifecycle handler, completing a step
//! records an outcome whose directives the case resolves and applies.
//!
//! # Key Principle
//!
//! **The engine never decides what an outcome means.** Every step carries
//! its own outcome map; the engine only applies the directives it finds
//! there, under the scenario's conflict policy.
//!
//! # Architecture
//!
//! The [`ActivityService`] composes:
//!
//! - [`ScenarioRegistry`]: validated blueprints by code
//! - [`CaseRepository`]: case persistence, whole-case save per command
//! - [`LifecycleDispatcher`]: side effects bound to step transitions
//! - [`PendingCallbackLedger`]: vendor requests awaiting their result
//! - [`Clock`] and [`IdGenerator`]: injectable time and identity
//!
//! # Example
//!
//! ```rust
//! use activity_engine::ActivityService;
//! use activity_types::*;
//!
//! let mut service = ActivityService::new();
//! service
//!     .register_scenario(
//!         ScenarioBlueprint::new("review", "Document review", ConflictPolicyKind::EscalateOnConflict)
//!             .with_stage(
//!                 StageBlueprint::new("read", "Read").with_step(
//!                     StepBlueprint::new("approve", "Approve the document").with_outcome(
//!                         "approved",
//!                         "Document approved",
//!                         OutcomeDirective::advance_stage(),
//!                     ),
//!                 ),
//!             ),
//!     )
//!     .unwrap();
//!
//! let case_id = CaseId::new("doc-1");
//! service
//!     .start_case(case_id.clone(), "ACME", &ScenarioCode::new("review"))
//!     .unwrap();
//!
//! let (stage, step) = (StageCode::new("read"), StepCode::new("approve"));
//! service.start_step(&case_id, &stage, &step).unwrap();
//! let outcome = service
//!     .complete_step(
//!         &case_id,
//!         &stage,
//!         &step,
//!         Outcome::new("approved", "Looks good", chrono::Utc::now()),
//!         None,
//!     )
//!     .unwrap();
//!
//! assert_eq!(outcome.case_state, CaseState::Completed);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod case;
pub mod clock;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod id_gen;
pub mod ledger;
pub mod registry;
pub mod repository;
pub mod service;
pub mod stage;
pub mod telemetry;

pub use action::Action;
pub use case::{Case, StepTransition};
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{Command, CommandOutcome};
pub use self::config::{CallbackConfig, EngineConfig, LoggingConfig};
pub use dispatcher::{ActionLifecycleHandler, LifecycleContext, LifecycleDispatcher};
pub use id_gen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use ledger::{CallbackWrites, InMemoryCallbackLedger, PendingCallbackLedger, StagedCallbacks};
pub use registry::ScenarioRegistry;
pub use repository::{CaseRepository, InMemoryCaseRepository};
pub use service::ActivityService;
pub use stage::Stage;
pub use telemetry::init_tracing;
