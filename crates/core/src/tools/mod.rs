//! # Tools
//!
//! Deterministic machinery around agent output.
//!
//! ## Modules
//!
//! - `materializer` - Confined, directory-creating writes of extracted artifacts

pub mod materializer;

pub use materializer::{Materializer, OutputFile};
