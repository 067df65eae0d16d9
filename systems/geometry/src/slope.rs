//! Fixed-width slope bitsets.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Fixed denominator every slope value is scaled by.
pub const SLOPE_SCALE: i64 = 100_000;

/// Number of distinct slopes a [`SlopeMask`] can address.
pub const SLOPE_CAPACITY: usize = u128::BITS as usize;

/// Set of slope indices packed into a single 128-bit word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SlopeMask(u128);

impl SlopeMask {
    /// Mask with no slopes set.
    pub const EMPTY: SlopeMask = SlopeMask(0);

    /// Mask with the lowest `count` slopes set.
    ///
    /// Counts beyond [`SLOPE_CAPACITY`] saturate to a full word.
    #[must_use]
    pub const fn first(count: usize) -> Self {
        if count >= SLOPE_CAPACITY {
            Self(u128::MAX)
        } else {
            Self((1u128 << count) - 1)
        }
    }

    /// Returns a copy of the mask with the provided slope index set.
    #[must_use]
    pub const fn with(self, index: usize) -> Self {
        debug_assert!(index < SLOPE_CAPACITY);
        Self(self.0 | (1u128 << index))
    }

    /// Reports whether the provided slope index is set.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < SLOPE_CAPACITY && self.0 & (1u128 << index) != 0
    }

    /// Reports whether the two masks share at least one slope.
    #[must_use]
    pub const fn intersects(self, other: SlopeMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Reports whether no slope is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of slopes set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u128 {
        self.0
    }
}

impl BitAnd for SlopeMask {
    type Output = SlopeMask;

    fn bitand(self, rhs: SlopeMask) -> SlopeMask {
        SlopeMask(self.0 & rhs.0)
    }
}

impl BitAndAssign for SlopeMask {
    fn bitand_assign(&mut self, rhs: SlopeMask) {
        self.0 &= rhs.0;
    }
}

impl BitOr for SlopeMask {
    type Output = SlopeMask;

    fn bitor(self, rhs: SlopeMask) -> SlopeMask {
        SlopeMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for SlopeMask {
    fn bitor_assign(&mut self, rhs: SlopeMask) {
        self.0 |= rhs.0;
    }
}

impl Not for SlopeMask {
    type Output = SlopeMask;

    fn not(self) -> SlopeMask {
        SlopeMask(!self.0)
    }
}

/// Scaled slope `numerator / denominator`, or `None` when it does not lie
/// inside the canonical octant's `(0, 1]` range.
pub(crate) fn corner_slope(numerator: i64, denominator: i64) -> Option<i64> {
    if denominator <= 0 {
        return None;
    }

    let value = SLOPE_SCALE * numerator / denominator;
    (value > 0 && value <= SLOPE_SCALE).then_some(value)
}

/// The four half-cell corner slopes of the cell at `(y, x)` that survive
/// [`corner_slope`] filtering.
pub(crate) fn corner_slopes(y: u32, x: u32) -> impl Iterator<Item = i64> {
    let y = i64::from(y) * 1000;
    let x = i64::from(x) * 1000;
    [
        (y - 500, x - 500),
        (y - 500, x + 500),
        (y + 500, x - 500),
        (y + 500, x + 500),
    ]
    .into_iter()
    .filter_map(|(numerator, denominator)| corner_slope(numerator, denominator))
}

/// Inclusive slope range covered by the cell at `(y, x)`.
///
/// The lower bound is the bottom-right corner and the upper bound the
/// top-left corner. Cells on the `y = 0` row reach down to zero and the
/// origin is unbounded above.
pub(crate) fn slope_range(y: u32, x: u32) -> (i64, i64) {
    let y = i64::from(y) * 1000;
    let x = i64::from(x) * 1000;
    let min = if y == 0 {
        0
    } else {
        SLOPE_SCALE * (y - 500) / (x + 500)
    };
    let max = if x == 0 {
        i64::MAX
    } else {
        SLOPE_SCALE * (y + 500) / (x - 500)
    };
    (min, max)
}
