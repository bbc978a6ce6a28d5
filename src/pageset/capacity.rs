use rusqlite::Connection;
use serde::Serialize;

use super::grid::{PAGES_PER_LAYOUT, RESERVED_CELLS, available_positions};
use super::resolve_board;
use crate::error::{CapacityShortfall, Error};
use crate::model::Layout;

/// Room for a batch across every targeted layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityPlan {
    pub required: usize,
    /// Free cells in the tightest layout.
    pub available: usize,
    pub limiting_layout: i64,
    pub free_by_layout: Vec<(i64, usize)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LayoutUsage {
    pub id: i64,
    pub columns: u32,
    pub rows: u32,
    pub cells_per_page: u32,
    pub free_cells: usize,
    pub occupied_cells: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CapacityReport {
    pub board_id: i64,
    pub pages: u32,
    pub reserved_cells: usize,
    pub layouts: Vec<LayoutUsage>,
    /// Smallest free count over all layouts; what a batch can actually use.
    pub available_cells: usize,
    /// Largest occupied count over all layouts.
    pub occupied_cells: usize,
    pub limiting_layout: Option<i64>,
}

/// Checks that every layout in `layouts` can take `required` new cells.
///
/// The same content goes into each layout, so the layout with the fewest free
/// cells decides. Ties go to the earlier layout.
pub fn plan_capacity(
    conn: &Connection,
    layouts: &[Layout],
    required: usize,
) -> Result<CapacityPlan, Error> {
    let mut free_by_layout = Vec::with_capacity(layouts.len());
    for layout in layouts {
        let free = available_positions(conn, layout)?.len();
        log::debug!(
            "Layout {} ({}x{}): {free} free cells",
            layout.id,
            layout.columns,
            layout.rows
        );
        free_by_layout.push((layout.id, free));
    }

    let (limiting_layout, available) = free_by_layout
        .iter()
        .copied()
        .reduce(|min, next| if next.1 < min.1 { next } else { min })
        .ok_or_else(|| {
            Error::Configuration("content page has no layouts to place cells on".into())
        })?;

    if required > available {
        return Err(CapacityShortfall::new(required, available, limiting_layout).into());
    }

    Ok(CapacityPlan {
        required,
        available,
        limiting_layout,
        free_by_layout,
    })
}

/// Read-only summary of every layout on the content page.
pub fn capacity_report(conn: &Connection) -> Result<CapacityReport, Error> {
    let board = resolve_board(conn)?;

    let mut layouts = Vec::with_capacity(board.layouts.len());
    for layout in &board.layouts {
        let cells_per_page = layout.cells_per_page().ok_or_else(|| {
            Error::MalformedRow(format!("PageLayout {} grid is too large", layout.id))
        })?;
        let free_cells = available_positions(conn, layout)?.len();
        let occupied: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ElementPlacement WHERE PageLayoutId = ?1",
            [layout.id],
            |row| row.get(0),
        )?;
        layouts.push(LayoutUsage {
            id: layout.id,
            columns: layout.columns,
            rows: layout.rows,
            cells_per_page,
            free_cells,
            occupied_cells: occupied as usize,
        });
    }

    let limiting = layouts
        .iter()
        .reduce(|min, next| if next.free_cells < min.free_cells { next } else { min });
    let available_cells = limiting.map_or(0, |l| l.free_cells);
    let limiting_layout = limiting.map(|l| l.id);
    let occupied_cells = layouts.iter().map(|l| l.occupied_cells).max().unwrap_or(0);

    Ok(CapacityReport {
        board_id: board.id,
        pages: PAGES_PER_LAYOUT,
        reserved_cells: RESERVED_CELLS,
        layouts,
        available_cells,
        occupied_cells,
        limiting_layout,
    })
}
