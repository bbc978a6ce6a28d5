//! Storage and layout allocation for pageset files.
//!
//! A pageset is a SQLite file. New content lands on the single content page
//! ("board") and is mirrored into each of its grid layouts. Ids for `Button`
//! and `ElementReference` are assigned by hand from the `sqlite_sequence`
//! high-water mark captured at the start of a batch.

mod capacity;
mod grid;
mod home;
mod housekeeping;
mod insert;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::colour::Palette;
use crate::error::Error;
use crate::model::{Board, ContentItem, Layout};

pub use capacity::{CapacityPlan, CapacityReport, LayoutUsage, capacity_report, plan_capacity};
pub use grid::{
    MAX_LAYOUT_CELLS, PAGES_PER_LAYOUT, RESERVED_CELLS, available_positions, candidate_positions,
    free_positions, is_reserved, occupied_positions,
};
pub use home::{HomeCellOutcome, ensure_home_cell};
pub use housekeeping::{
    ExistingButtons, dotnet_ticks, existing_buttons, refresh_timestamps, set_grid_dimension,
    set_title,
};
pub use insert::{SPEAK_MESSAGE_COMMAND, insert_content};

/// Page titles that belong to the pageset chrome rather than its content.
pub const RESERVED_PAGE_TITLES: [&str; 2] = ["Dashboard", "Message Bar"];

pub(crate) const BUTTON_TABLE: &str = "Button";
pub(crate) const ELEMENT_REFERENCE_TABLE: &str = "ElementReference";

/// An open pageset file.
pub struct Pageset {
    conn: Connection,
    path: PathBuf,
}

impl Pageset {
    /// Opens an existing pageset for reading and writing. Never creates one.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Self::open_with(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    pub fn open_read_only(path: &Path) -> Result<Self, Error> {
        Self::open_with(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    fn open_with(path: &Path, flags: OpenFlags) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("pageset not found: {}", path.display()),
            )));
        }
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn board(&self) -> Result<Board, Error> {
        resolve_board(&self.conn)
    }

    pub fn capacity_report(&self) -> Result<CapacityReport, Error> {
        capacity_report(&self.conn)
    }

    pub fn plan_capacity(
        &self,
        target_layouts: Option<&[i64]>,
        required: usize,
    ) -> Result<CapacityPlan, Error> {
        let board = resolve_board(&self.conn)?;
        let layouts = select_layouts(&board, target_layouts)?;
        plan_capacity(&self.conn, &layouts, required)
    }

    pub fn insert_content(
        &mut self,
        items: &[ContentItem],
        target_layouts: Option<&[i64]>,
        palette: &Palette,
    ) -> Result<usize, Error> {
        insert_content(&mut self.conn, items, target_layouts, palette)
    }

    pub fn ensure_home_cell(&mut self, template: &Path) -> Result<HomeCellOutcome, Error> {
        ensure_home_cell(&mut self.conn, template)
    }

    pub fn existing_buttons(&self) -> Result<ExistingButtons, Error> {
        existing_buttons(&self.conn)
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), Error> {
        set_title(&mut self.conn, title)
    }

    pub fn set_grid_dimension(&mut self, dimension: Option<&str>) -> Result<(), Error> {
        set_grid_dimension(&mut self.conn, dimension)
    }

    pub fn refresh_timestamps(&mut self) -> Result<i64, Error> {
        refresh_timestamps(&mut self.conn)
    }
}

/// Finds the one content page and its layouts.
///
/// Anything other than exactly one page outside [`RESERVED_PAGE_TITLES`] is a
/// configuration error naming every candidate.
pub fn resolve_board(conn: &Connection) -> Result<Board, Error> {
    let mut stmt = conn.prepare("SELECT Id, Title FROM Page WHERE Title NOT IN (?1, ?2)")?;
    let pages = stmt
        .query_map(params![RESERVED_PAGE_TITLES[0], RESERVED_PAGE_TITLES[1]], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let (id, title) = match pages.as_slice() {
        [] => return Err(Error::Configuration("no content page found".into())),
        [(id, title)] => (*id, title.clone().unwrap_or_default()),
        _ => {
            let titles: Vec<&str> = pages
                .iter()
                .map(|(_, t)| t.as_deref().unwrap_or(""))
                .collect();
            return Err(Error::Configuration(format!(
                "found multiple content pages: {}",
                titles.join(", ")
            )));
        }
    };

    let mut stmt =
        conn.prepare("SELECT Id, PageLayoutSetting FROM PageLayout WHERE PageId = ?1 ORDER BY Id")?;
    let rows = stmt
        .query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut layouts = Vec::with_capacity(rows.len());
    for (layout_id, setting) in rows {
        layouts.push(parse_layout(layout_id, &setting)?);
    }
    log::debug!("Content page {id} ({title:?}) has {} layout(s)", layouts.len());

    Ok(Board { id, title, layouts })
}

fn parse_layout(id: i64, setting: &str) -> Result<Layout, Error> {
    let Some((columns, rows)) = crate::model::parse_pair(setting) else {
        return Err(Error::MalformedRow(format!(
            "PageLayout {id} has unusable setting {setting:?}"
        )));
    };
    if columns == 0 || rows == 0 {
        return Err(Error::MalformedRow(format!(
            "PageLayout {id} has an empty grid {setting:?}"
        )));
    }
    let total = columns
        .checked_mul(rows)
        .and_then(|cells| cells.checked_mul(PAGES_PER_LAYOUT));
    if total.is_none_or(|cells| cells > MAX_LAYOUT_CELLS) {
        return Err(Error::MalformedRow(format!(
            "PageLayout {id} grid {setting:?} exceeds {MAX_LAYOUT_CELLS} cells"
        )));
    }
    Ok(Layout { id, columns, rows })
}

/// Narrows the board's layouts to `targets`, keeping board order. `None` means all.
/// An empty target list selects nothing and is rejected.
pub fn select_layouts(board: &Board, targets: Option<&[i64]>) -> Result<Vec<Layout>, Error> {
    let Some(targets) = targets else {
        return Ok(board.layouts.clone());
    };
    if targets.is_empty() {
        return Err(Error::Configuration(
            "empty target layout list; pass no targets to fill every layout".into(),
        ));
    }
    if let Some(unknown) = targets
        .iter()
        .find(|id| !board.layouts.iter().any(|l| l.id == **id))
    {
        return Err(Error::UnknownLayout(*unknown));
    }
    Ok(board
        .layouts
        .iter()
        .filter(|l| targets.contains(&l.id))
        .copied()
        .collect())
}

/// Next id for `table`: one past its `sqlite_sequence` mark, or 1 if never written.
pub fn next_id(conn: &Connection, table: &str) -> Result<i64, Error> {
    let mark: Option<i64> = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(mark.map_or(1, |seq| seq + 1))
}
