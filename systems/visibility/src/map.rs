//! Per-level storage for the `View`, `Seen` and `Mark` flags.

use sightline_core::{grid_index, CellCoord, SightFlags};

/// Dense grid of sight flags owned by a level.
///
/// Only the sight systems in this crate can write flags; every other crate
/// gets the read accessors below. Queries outside the grid report "not
/// visible" rather than failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SightMap {
    rows: u32,
    columns: u32,
    flags: Vec<SightFlags>,
}

impl SightMap {
    /// Allocates cleared flag storage for a grid of the provided size.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            flags: vec![SightFlags::empty(); capacity],
        }
    }

    /// Provides the dimensions of the grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Flags stored for the cell; empty outside the grid.
    #[must_use]
    pub fn flags(&self, cell: CellCoord) -> SightFlags {
        grid_index(cell, self.rows, self.columns)
            .and_then(|index| self.flags.get(index).copied())
            .unwrap_or_default()
    }

    /// Reports whether the cell is in geometric line of sight.
    #[must_use]
    pub fn in_view(&self, cell: CellCoord) -> bool {
        self.flags(cell).contains(SightFlags::VIEW)
    }

    /// Reports whether the cell is in view and illuminated.
    #[must_use]
    pub fn seen(&self, cell: CellCoord) -> bool {
        self.flags(cell).contains(SightFlags::SEEN)
    }

    /// Reports whether the cell is remembered.
    #[must_use]
    pub fn marked(&self, cell: CellCoord) -> bool {
        self.flags(cell).contains(SightFlags::MARK)
    }

    /// Number of cells carrying every flag in `flag`.
    #[must_use]
    pub fn count(&self, flag: SightFlags) -> usize {
        self.flags.iter().filter(|flags| flags.contains(flag)).count()
    }

    /// Iterator over every cell that carries all of `flag`, in row-major order.
    pub fn cells_with(&self, flag: SightFlags) -> impl Iterator<Item = CellCoord> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(move |(_, flags)| flags.contains(flag))
            .map(|(index, _)| self.cell_at(index))
    }

    /// Iterator over every cell and its flags, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, SightFlags)> + '_ {
        self.flags
            .iter()
            .enumerate()
            .map(|(index, flags)| (self.cell_at(index), *flags))
    }

    pub(crate) fn len(&self) -> usize {
        self.flags.len()
    }

    pub(crate) fn cell_at(&self, index: usize) -> CellCoord {
        let width = self.columns.max(1) as usize;
        CellCoord::new((index / width) as u32, (index % width) as u32)
    }

    pub(crate) fn get(&self, index: usize) -> SightFlags {
        self.flags.get(index).copied().unwrap_or_default()
    }

    pub(crate) fn insert(&mut self, index: usize, flag: SightFlags) {
        if let Some(slot) = self.flags.get_mut(index) {
            slot.insert(flag);
        }
    }

    /// Clears `View` and, with it, `Seen` on every cell.
    pub(crate) fn clear_view(&mut self) {
        for flags in &mut self.flags {
            flags.remove(SightFlags::VIEW | SightFlags::SEEN);
        }
    }

    pub(crate) fn clear_marks(&mut self) {
        for flags in &mut self.flags {
            flags.remove(SightFlags::MARK);
        }
    }
}
