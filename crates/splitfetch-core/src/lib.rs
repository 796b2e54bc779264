//! Core types and metadata for splitfetch.
//!
//! This crate provides the foundational abstractions the split-query loader
//! is built on:
//!
//! - `EntityType` / `NavigationInfo` metadata describing schema identity
//! - `EntityData` records with explicit per-navigation load state
//! - `Value` for dynamically-typed column data
//! - back-reference resolution from navigation metadata
//! - the shared error taxonomy

pub mod entity;
pub mod error;
pub mod field;
pub mod record;
pub mod resolve;
pub mod value;

pub use entity::{EntityType, NavigationInfo, NavigationKind};
pub use error::{BackendError, Error, Result};
pub use field::FieldInfo;
pub use record::{CollectionState, EntityData, EntityRef, LoadState, ReferenceState};
pub use resolve::{BackReference, resolve_back_reference};
pub use value::Value;
