use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Error;
use crate::model::{GridPosition, Layout};

/// Pages chained vertically inside one layout's address space.
pub const PAGES_PER_LAYOUT: u32 = 10;

/// Upper bound on the cells a single layout may address over all its pages.
pub const MAX_LAYOUT_CELLS: u32 = 100_000;

/// Home cell on every page plus a back cell on every page but the first.
pub const RESERVED_CELLS: usize = 2 * PAGES_PER_LAYOUT as usize - 1;

/// Bottom-right of each page holds the home cell; top-right of each page
/// after the first holds the back cell.
pub fn is_reserved(position: GridPosition, columns: u32, rows: u32) -> bool {
    if rows == 0 || position.column + 1 != columns {
        return false;
    }
    let row_in_page = position.row % rows;
    row_in_page + 1 == rows || (row_in_page == 0 && position.row != 0)
}

/// Every assignable cell of a `columns x rows` layout over `pages` pages,
/// row-major: top to bottom, left to right within a row.
pub fn candidate_positions(columns: u32, rows: u32, pages: u32) -> Vec<GridPosition> {
    let Some(total_rows) = rows.checked_mul(pages) else {
        return Vec::new();
    };
    if columns == 0 || rows == 0 {
        return Vec::new();
    }
    (0..total_rows)
        .flat_map(|row| (0..columns).map(move |column| GridPosition::new(column, row)))
        .filter(|&pos| !is_reserved(pos, columns, rows))
        .collect()
}

/// Removes occupied cells from `candidates`, keeping candidate order.
pub fn free_positions(
    candidates: Vec<GridPosition>,
    occupied: &HashSet<GridPosition>,
) -> Vec<GridPosition> {
    candidates
        .into_iter()
        .filter(|pos| !occupied.contains(pos))
        .collect()
}

/// Coordinates already taken on `layout_id`.
pub fn occupied_positions(
    conn: &Connection,
    layout_id: i64,
) -> Result<HashSet<GridPosition>, Error> {
    let mut stmt =
        conn.prepare("SELECT Id, GridPosition FROM ElementPlacement WHERE PageLayoutId = ?1")?;
    let rows = stmt.query_map([layout_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut occupied = HashSet::new();
    for row in rows {
        let (id, text) = row?;
        let pos = GridPosition::parse(&text).ok_or_else(|| {
            Error::MalformedRow(format!("ElementPlacement {id} has grid position {text:?}"))
        })?;
        occupied.insert(pos);
    }
    Ok(occupied)
}

/// Free cells of `layout` in allocation order.
pub fn available_positions(conn: &Connection, layout: &Layout) -> Result<Vec<GridPosition>, Error> {
    let occupied = occupied_positions(conn, layout.id)?;
    let candidates = candidate_positions(layout.columns, layout.rows, PAGES_PER_LAYOUT);
    Ok(free_positions(candidates, &occupied))
}
