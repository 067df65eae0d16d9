//! Reflections that map the canonical octant onto the eight real ones.

use sightline_core::CellCoord;

/// One of the eight 45° wedges around a viewer.
///
/// Names give the compass span each wedge covers, with rows growing to the
/// south and columns growing to the east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Octant {
    /// East to south-east: `(py + dy, px + dx)`.
    EastSouthEast,
    /// South to south-east: `(py + dx, px + dy)`.
    SouthSouthEast,
    /// South to south-west: `(py + dx, px - dy)`.
    SouthSouthWest,
    /// West to south-west: `(py + dy, px - dx)`.
    WestSouthWest,
    /// West to north-west: `(py - dy, px - dx)`.
    WestNorthWest,
    /// North to north-west: `(py - dx, px - dy)`.
    NorthNorthWest,
    /// North to north-east: `(py - dx, px + dy)`.
    NorthNorthEast,
    /// East to north-east: `(py - dy, px + dx)`.
    EastNorthEast,
}

impl Octant {
    /// Every octant, in sweep order.
    pub const ALL: [Octant; 8] = [
        Octant::EastSouthEast,
        Octant::SouthSouthEast,
        Octant::SouthSouthWest,
        Octant::WestSouthWest,
        Octant::WestNorthWest,
        Octant::NorthNorthWest,
        Octant::NorthNorthEast,
        Octant::EastNorthEast,
    ];

    /// Row and column delta of the canonical offset `(dy, dx)` in this octant.
    #[must_use]
    pub const fn delta(self, dy: i64, dx: i64) -> (i64, i64) {
        match self {
            Self::EastSouthEast => (dy, dx),
            Self::SouthSouthEast => (dx, dy),
            Self::SouthSouthWest => (dx, -dy),
            Self::WestSouthWest => (dy, -dx),
            Self::WestNorthWest => (-dy, -dx),
            Self::NorthNorthWest => (-dx, -dy),
            Self::NorthNorthEast => (-dx, dy),
            Self::EastNorthEast => (-dy, dx),
        }
    }

    /// Absolute cell reached from `origin` by the canonical offset `(dy, dx)`.
    ///
    /// Returns `None` when the reflected position falls above or left of the
    /// grid; callers still bounds-check the far edges.
    #[must_use]
    pub fn project(self, origin: CellCoord, dy: u32, dx: u32) -> Option<CellCoord> {
        let (row_delta, column_delta) = self.delta(i64::from(dy), i64::from(dx));
        let row = u32::try_from(i64::from(origin.row()) + row_delta).ok()?;
        let column = u32::try_from(i64::from(origin.column()) + column_delta).ok()?;
        Some(CellCoord::new(row, column))
    }
}
