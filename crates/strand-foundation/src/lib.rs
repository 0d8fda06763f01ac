//! Core types and traits for the strand system
//!
//! This crate provides the protocol data model, the error taxonomy, and the
//! analysis-engine contract that are shared across all workspace crates. It
//! has no dependencies on other strand-* crates to prevent circular
//! dependencies.

pub mod engine;
pub mod error;
pub mod protocol;

pub use engine::AnalysisEngine;
pub use error::{StrandError, StrandResult};
pub use protocol::{
    ChangeSet, ChangeSetInfo, CompletionCandidate, DefinitionLocation, EditPayload, Resource,
    ResourceChange, ResourceChangeInfo,
};
