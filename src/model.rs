use std::fmt;

use serde::Serialize;

/// One cell's worth of content handed to the pageset: what the cell shows,
/// what it speaks, and the group (slide number) that picks its colour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    pub label: String,
    pub message: String,
    pub group: u32,
}

impl ContentItem {
    pub fn new(label: impl Into<String>, message: impl Into<String>, group: u32) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
            group,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slide {
    pub number: u32,
    pub title: String,
    pub notes: String,
}

/// The single content page of a pageset and the grid variants it owns.
#[derive(Clone, Debug)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub layouts: Vec<Layout>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub id: i64,
    pub columns: u32,
    pub rows: u32,
}

impl Layout {
    /// `None` when the grid is too large to count in a `u32`.
    pub fn cells_per_page(&self) -> Option<u32> {
        self.columns.checked_mul(self.rows)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPosition {
    pub column: u32,
    pub row: u32,
}

impl GridPosition {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parses the store's `"col,row"` text.
    pub fn parse(text: &str) -> Option<Self> {
        parse_pair(text).map(|(column, row)| Self { column, row })
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.column, self.row)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpan {
    pub columns: u32,
    pub rows: u32,
}

impl GridSpan {
    pub const SINGLE: GridSpan = GridSpan {
        columns: 1,
        rows: 1,
    };

    pub fn parse(text: &str) -> Option<Self> {
        parse_pair(text).map(|(columns, rows)| Self { columns, rows })
    }
}

impl fmt::Display for GridSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.columns, self.rows)
    }
}

/// A row of `ElementPlacement`. `id` is `None` until the store assigns one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub id: Option<i64>,
    pub position: GridPosition,
    pub span: GridSpan,
    pub visible: bool,
    pub element_reference_id: i64,
    pub layout_id: i64,
}

impl Placement {
    /// Same cell, re-homed onto another layout with a fresh id.
    pub fn for_layout(&self, layout_id: i64) -> Placement {
        Placement {
            id: None,
            layout_id,
            ..self.clone()
        }
    }
}

/// First two comma-separated integers of a packed text field; the rest is ignored.
pub(crate) fn parse_pair(text: &str) -> Option<(u32, u32)> {
    let mut fields = text.split(',').map(str::trim);
    let first = fields.next()?.parse().ok()?;
    let second = fields.next()?.parse().ok()?;
    Some((first, second))
}
