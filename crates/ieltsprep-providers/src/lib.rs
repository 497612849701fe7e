//! ieltsprep-providers — service integrations.
//!
//! Implements the `DocumentStore`, `IdentityProvider` and `EssayEvaluator`
//! traits for Firestore, Firebase Authentication and Gemini, plus a JSON file
//! store and in-memory doubles for offline use.

pub mod config;
pub mod error;
pub mod file_store;
pub mod firestore;
pub mod gemini;
pub mod identity;
pub mod mock;

pub use config::{
    create_evaluator, create_identity, create_store, load_config, IeltsprepConfig, StoreConfig,
};
pub use error::ProviderError;
