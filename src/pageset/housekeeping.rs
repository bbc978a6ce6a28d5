use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use super::resolve_board;
use crate::error::Error;

/// 100ns ticks between 0001-01-01 and the Unix epoch.
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExistingButtons {
    pub count: i64,
    /// Up to three non-empty labels, for a "this pageset isn't blank" warning.
    pub samples: Vec<String>,
}

pub fn existing_buttons(conn: &Connection) -> Result<ExistingButtons, Error> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM Button", [], |row| row.get(0))?;
    let mut samples = Vec::new();
    if count > 0 {
        let mut stmt = conn.prepare("SELECT Label FROM Button ORDER BY Id LIMIT 3")?;
        for label in stmt.query_map([], |row| row.get::<_, Option<String>>(0))? {
            if let Some(label) = label?
                && !label.is_empty()
            {
                samples.push(label);
            }
        }
    }
    Ok(ExistingButtons { count, samples })
}

/// Renames the pageset and its content page.
pub fn set_title(conn: &mut Connection, title: &str) -> Result<(), Error> {
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE PageSetProperties SET FriendlyName = ?1 WHERE Id = 1",
        [title],
    )?;
    let board = resolve_board(&tx)?;
    tx.execute("UPDATE Page SET Title = ?1 WHERE Id = ?2", params![title, board.id])?;
    tx.commit()?;
    log::info!("Pageset renamed to {title:?}");
    Ok(())
}

/// `None` stores NULL, which makes the page follow the pageset's own grid.
pub fn set_grid_dimension(conn: &mut Connection, dimension: Option<&str>) -> Result<(), Error> {
    let tx = conn.transaction()?;
    let board = resolve_board(&tx)?;
    tx.execute(
        "UPDATE Page SET GridDimension = ?1 WHERE Id = ?2",
        params![dimension, board.id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Stamps every sync timestamp with the current time. Returns the value written.
pub fn refresh_timestamps(conn: &mut Connection) -> Result<i64, Error> {
    let now = dotnet_ticks(SystemTime::now());
    let tx = conn.transaction()?;
    tx.execute("UPDATE Page SET TimeStamp = ?1", [now])?;
    tx.execute("UPDATE Synchronization SET PageSetTimestamp = ?1", [now])?;
    tx.execute("UPDATE PageSetProperties SET TimeStamp = ?1", [now])?;
    tx.commit()?;
    log::debug!("Timestamps set to {now}");
    Ok(now)
}

/// `time` as 100ns ticks since 0001-01-01 UTC.
pub fn dotnet_ticks(time: SystemTime) -> i64 {
    let since_epoch = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_nanos() / 100) as i64,
        Err(e) => -((e.duration().as_nanos() / 100) as i64),
    };
    TICKS_AT_UNIX_EPOCH + since_epoch
}
