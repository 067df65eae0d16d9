//! One-time precomputation of the canonical octant.
//!
//! The table lists every offset `(dy, dx)` with `0 <= dy <= dx` inside the
//! sight radius, ordered by distance from the origin. Each entry records the
//! slopes that pass through it and the indices of the two entries reached by
//! stepping one further row or column outward, so a sweep can propagate
//! occlusion along each branch without redoing any geometry.

use std::collections::HashMap;

use sightline_core::distance;
use thiserror::Error;

use crate::slope::{corner_slopes, slope_range, SlopeMask, SLOPE_CAPACITY};

/// Errors raised while building a [`VisibilityTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    /// The radius produces more distinct slopes than a [`SlopeMask`] holds.
    #[error(
        "sight radius {radius} needs at least {slopes} distinct slopes but masks hold only {capacity}"
    )]
    SlopeOverflow {
        /// Radius that was requested.
        radius: u32,
        /// Number of slopes discovered before giving up.
        slopes: usize,
        /// Capacity of a slope mask.
        capacity: usize,
    },
}

/// Single entry of the canonical octant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityCell {
    dy: u32,
    dx: u32,
    distance: u32,
    mask: SlopeMask,
    next_row: Option<usize>,
    next_column: Option<usize>,
}

impl VisibilityCell {
    /// Offset along the minor axis, never larger than [`Self::dx`].
    #[must_use]
    pub const fn dy(&self) -> u32 {
        self.dy
    }

    /// Offset along the major axis.
    #[must_use]
    pub const fn dx(&self) -> u32 {
        self.dx
    }

    /// Octagonal distance from the origin.
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }

    /// Slopes that pass through the cell.
    #[must_use]
    pub const fn mask(&self) -> SlopeMask {
        self.mask
    }

    /// Index of the entry at `(dy + 1, dx)`, if it lies in the octant.
    #[must_use]
    pub const fn next_row(&self) -> Option<usize> {
        self.next_row
    }

    /// Index of the entry at `(dy, dx + 1)`, if it lies in the radius.
    #[must_use]
    pub const fn next_column(&self) -> Option<usize> {
        self.next_column
    }

    /// Both successors, skipping the missing ones.
    pub fn successors(&self) -> impl Iterator<Item = usize> {
        self.next_row.into_iter().chain(self.next_column)
    }

    /// Number of distinct absolute cells this entry maps to across all octants.
    #[must_use]
    pub const fn multiplicity(&self) -> u32 {
        if self.dx == 0 {
            1
        } else if self.dy == 0 || self.dy == self.dx {
            4
        } else {
            8
        }
    }
}

/// Immutable, distance-ordered geometry for one canonical octant.
#[derive(Clone, Debug)]
pub struct VisibilityTable {
    radius: u32,
    cells: Vec<VisibilityCell>,
    slopes: Vec<i64>,
}

impl VisibilityTable {
    /// Builds the table for the provided maximum sight radius.
    ///
    /// Fails when the radius needs more distinct slopes than a
    /// [`SlopeMask`] can address; callers treat that as a fatal
    /// configuration error.
    pub fn build(radius: u32) -> Result<Self, TableError> {
        let mut offsets: Vec<(u32, u32)> = Vec::new();
        let mut slopes: Vec<i64> = Vec::new();

        for ring in 0..=radius {
            let start = offsets.len();
            offsets.extend(ring_offsets(ring));

            for &(y, x) in &offsets[start..] {
                for slope in corner_slopes(y, x) {
                    if !slopes.contains(&slope) {
                        slopes.push(slope);
                    }
                }
            }

            if slopes.len() > SLOPE_CAPACITY {
                return Err(TableError::SlopeOverflow {
                    radius,
                    slopes: slopes.len(),
                    capacity: SLOPE_CAPACITY,
                });
            }
        }

        let positions: HashMap<(u32, u32), usize> = offsets
            .iter()
            .enumerate()
            .map(|(index, &offset)| (offset, index))
            .collect();

        let cells: Vec<VisibilityCell> = offsets
            .iter()
            .enumerate()
            .map(|(index, &(y, x))| {
                let next_row = if y < x {
                    positions.get(&(y + 1, x)).copied()
                } else {
                    None
                };
                let next_column = positions.get(&(y, x + 1)).copied();
                debug_assert!(next_row.map_or(true, |next| next > index));
                debug_assert!(next_column.map_or(true, |next| next > index));

                VisibilityCell {
                    dy: y,
                    dx: x,
                    distance: distance(0, 0, y as i32, x as i32),
                    mask: cell_mask(y, x, &slopes),
                    next_row,
                    next_column,
                }
            })
            .collect();

        log::info!(
            "built visibility table: radius {radius}, {} cells, {} slopes",
            cells.len(),
            slopes.len()
        );

        Ok(Self {
            radius,
            cells,
            slopes,
        })
    }

    /// Radius the table was built for.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Entries in non-decreasing distance order; entry 0 is the origin.
    #[must_use]
    pub fn cells(&self) -> &[VisibilityCell] {
        &self.cells
    }

    /// Number of entries in the canonical octant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: the origin is present for every radius.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct slope values, indexed by their bit position.
    #[must_use]
    pub fn slopes(&self) -> &[i64] {
        &self.slopes
    }

    /// Number of distinct slopes.
    #[must_use]
    pub fn slope_count(&self) -> usize {
        self.slopes.len()
    }

    /// Mask with every known slope set.
    #[must_use]
    pub fn full_mask(&self) -> SlopeMask {
        SlopeMask::first(self.slopes.len())
    }

    /// Number of absolute cells within the radius around a viewer.
    #[must_use]
    pub fn full_circle_len(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.multiplicity() as usize)
            .sum()
    }

    /// Number of leading entries whose distance does not exceed `radius`.
    #[must_use]
    pub fn prefix_within(&self, radius: u32) -> usize {
        self.cells.partition_point(|cell| cell.distance() <= radius)
    }
}

/// Offsets at exactly `ring` distance from the origin, ordered by `x` then `y`.
fn ring_offsets(ring: u32) -> Vec<(u32, u32)> {
    let mut offsets = Vec::new();
    for y in 0..=ring {
        let x = ring - y / 2;
        if y <= x {
            offsets.push((y, x));
        }
    }
    offsets.sort_unstable_by_key(|&(y, x)| (x, y));
    offsets
}

fn cell_mask(y: u32, x: u32, slopes: &[i64]) -> SlopeMask {
    let (min, max) = slope_range(y, x);
    slopes
        .iter()
        .enumerate()
        .filter(|&(_, &slope)| min <= slope && slope <= max)
        .fold(SlopeMask::EMPTY, |mask, (index, _)| mask.with(index))
}
