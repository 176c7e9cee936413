//! Grid board entity.
//!
//! The board is a `w × h` grid addressed with screen coordinates: `(0, 0)` is
//! the top-left cell, `x` grows to the right and `y` grows downwards.  Only
//! occupied cells are stored; every coordinate missing from the map is empty.
//!
//! The server is trusted for board semantics, so the board never rejects a
//! cell whose coordinate lies outside `[0, w) × [0, h)`.  Callers that care
//! about the grid edge use [`Board::contains`].

use std::collections::BTreeMap;
use std::fmt;

/// A signed grid coordinate.
///
/// Signed because the server reports dead players at `(-1, -1)` and because
/// a move target next to the edge may fall off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate shifted by `(dx, dy)`, or `None` if the
    /// result does not fit in an `i64`.
    pub fn checked_offset(self, dx: i64, dy: i64) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Marker stored in an occupied cell.
///
/// Tron sends the index of the player whose trail covers the cell, but the
/// protocol allows any number or string, so both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Immutable view of the game grid for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    cells: BTreeMap<Coord, CellValue>,
}

impl Board {
    /// Builds a board from its dimensions and the sparse cell map.
    pub fn new(width: u32, height: u32, cells: BTreeMap<Coord, CellValue>) -> Self {
        Self {
            width,
            height,
            cells,
        }
    }

    /// Builds a board with no occupied cells.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(width, height, BTreeMap::new())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if `coord` lies inside `[0, w) × [0, h)`.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < i64::from(self.width)
            && coord.y < i64::from(self.height)
    }

    /// Returns `true` if the server reported any value at `coord`.
    ///
    /// Occupancy ignores the value itself and does not look at the grid
    /// bounds: an off-grid coordinate is unoccupied unless the server sent
    /// a cell for it.
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Returns the marker at `coord`, if any.
    pub fn cell(&self, coord: Coord) -> Option<&CellValue> {
        self.cells.get(&coord)
    }

    /// Iterates over occupied cells in `(x, y)` order.
    pub fn cells(&self) -> impl Iterator<Item = (&Coord, &CellValue)> {
        self.cells.iter()
    }

    /// Number of occupied cells, including any outside the grid.
    pub fn occupied_count(&self) -> usize {
        self.cells.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
