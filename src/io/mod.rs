//! Input/output helpers.
//!
//! - entry-form / CSV / `--point` ingest (`ingest`)
//! - per-observation result export (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
