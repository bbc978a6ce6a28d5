use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store failure. Raised mid-transaction it is returned as-is after rollback.
    #[error("pageset store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("pageset configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Capacity(#[from] CapacityShortfall),

    #[error("layout {0} does not belong to the content page")]
    UnknownLayout(i64),

    #[error("malformed pageset row: {0}")]
    MalformedRow(String),

    #[error("invalid PPTX: {0}")]
    InvalidPptx(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("no slides with speaker notes to convert")]
    NoContent,
}

/// The limiting layout could not hold the whole batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityShortfall {
    pub required: usize,
    pub available: usize,
    pub shortage: usize,
    pub limiting_layout: i64,
}

impl CapacityShortfall {
    pub fn new(required: usize, available: usize, limiting_layout: i64) -> Self {
        Self {
            required,
            available,
            shortage: required.saturating_sub(available),
            limiting_layout,
        }
    }
}

impl fmt::Display for CapacityShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "not enough grid space: required {} cells, available {} cells (limited by layout {}), shortage {} cells",
            self.required, self.available, self.limiting_layout, self.shortage
        )
    }
}

impl std::error::Error for CapacityShortfall {}
