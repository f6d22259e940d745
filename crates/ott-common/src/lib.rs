//! OTT Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the OTT taxonomy workspace.
//!
//! - **Error Handling**: [`OttError`] and the [`Result`] alias used by every crate
//! - **Logging**: `tracing` subscriber setup shared by the binaries
//!
//! # Example
//!
//! ```no_run
//! use ott_common::{OttError, Result};
//!
//! fn require_loaded(rows: usize) -> Result<()> {
//!     if rows == 0 {
//!         return Err(OttError::NoTaxonomyLoaded);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{OttError, Result};
