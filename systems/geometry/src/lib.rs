#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Precomputed sight geometry shared by every viewer.
//!
//! The [`VisibilityTable`] is built once at startup for the maximum sight
//! radius and then shared read-only, typically behind an `Arc`, by every
//! level and every sweep. [`Octant`] maps its canonical entries onto the
//! eight real wedges around a viewer.

pub mod octant;
pub mod slope;
pub mod table;

pub use octant::Octant;
pub use slope::{SlopeMask, SLOPE_CAPACITY, SLOPE_SCALE};
pub use table::{TableError, VisibilityCell, VisibilityTable};
