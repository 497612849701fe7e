//! ieltsprep-core — exam state machine, band scoring, and service traits.
//!
//! This crate holds everything the client does without touching the network:
//! the data model, the reading/writing band calculations, the timed exam
//! session, onboarding and practice flows, and the data gateway that sits on
//! top of the abstract `DocumentStore`, `IdentityProvider` and
//! `EssayEvaluator` traits implemented in `ieltsprep-providers`.

pub mod content;
pub mod error;
pub mod exam;
pub mod gateway;
pub mod grading;
pub mod model;
pub mod onboarding;
pub mod orchestrator;
pub mod practice;
pub mod scoring;
pub mod traits;
