//! Split-query execution.
//!
//! This crate runs split-enabled queries: it strips the fetch directives
//! off the root query, issues one filtered query per fetch path, reconciles
//! every row through a per-execution identity map, and stitches the loaded
//! children back onto their parents with the navigations marked loaded.
//!
//! [`Session`] is the entry point; [`QueryBackend`] is the seam a real
//! database integration implements. [`MemoryBackend`] is a complete
//! in-memory implementation used by the test suite.

pub mod backend;
pub mod cancel;
pub mod hydrate;
pub mod identity_map;
pub mod memory;
pub mod split;

pub use backend::{QueryBackend, QueryResult};
pub use cancel::CancelToken;
pub use hydrate::hydrate;
pub use identity_map::{IdentityMap, hash_key};
pub use memory::MemoryBackend;
pub use split::{LoadResult, Session};
