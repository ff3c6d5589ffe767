//! # sage-core
//!
//! Core types, ID generation, and error types for Sage.
//!
//! This crate provides the foundational types shared across all Sage crates:
//! - Entity structs for the persisted project record (wizard snapshot, outline, drafts)
//! - Stage enums with state machine transitions
//! - The framework-independent wizard state machine (`WizardState::apply`)
//! - The static paper-type catalog
//! - ID prefix constants and generation helpers
//! - Cross-cutting error types

pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod wizard;
