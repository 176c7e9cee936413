//! Plain-text board rendering for debug logs.
//!
//! Rendering has no effect on the protocol; it only gives a human something
//! to look at in the log while a game is running.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::domain::board::Coord;
use crate::domain::snapshot::Snapshot;

/// Renders the board row by row, `y` from `0` to `h - 1`.
///
/// Each player's cell shows a letter (`A` for the first player, `B` for the
/// second, ...).  Other cells show their terrain value, or a space when empty.
/// Every row, including the last, ends with `\n`.  Cells and players outside
/// the grid are not drawn.
///
/// Boards with more than [`RENDER_CELL_LIMIT`] cells are not drawn; a single
/// summary line is returned instead.
pub fn render(snapshot: &Snapshot) -> String {
    let board = snapshot.board();
    let (width, height) = (u64::from(board.width()), u64::from(board.height()));
    let area = width * height;
    if area > RENDER_CELL_LIMIT {
        return format!("<{width}x{height} board too large to render>\n");
    }

    // Bounded by the limit, so the cast cannot truncate.
    let mut out = String::with_capacity(((width + 1) * height) as usize);

    let mut occupants = BTreeMap::new();
    for p in snapshot.players() {
        occupants.entry(p.position).or_insert(p.index);
    }

    for y in 0..i64::from(board.height()) {
        for x in 0..i64::from(board.width()) {
            let here = Coord::new(x, y);
            if let Some(&index) = occupants.get(&here) {
                out.push(player_letter(index));
            } else if let Some(value) = board.cell(here) {
                // Writing into a String cannot fail.
                let _ = write!(out, "{value}");
            } else {
                out.push(' ');
            }
        }
        out.push('\n');
    }

    out
}

/// Largest board, in cells, that [`render`] draws.
pub const RENDER_CELL_LIMIT: u64 = 1 << 20;

fn player_letter(index: usize) -> char {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i),
        _ => '?',
    }
}
