//! arule-core: shared foundation for the ARULE bridge crates.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - layout (on-disk directory and file naming contract of the engine)
//! - error (shared error types)

pub mod error;
pub mod layout;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use layout::AruleLayout;
pub use numeric::*;
