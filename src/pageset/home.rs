use std::path::Path;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::resolve_board;
use crate::error::Error;
use crate::model::{Board, GridPosition, GridSpan, Placement};

const TEMPLATE_SCHEMA: &str = "home_template";
const HOME_LABEL: &str = "Home";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeCellOutcome {
    /// The pageset already had buttons; nothing was copied.
    Skipped { existing_buttons: i64 },
    /// The template's home cell now sits on each of `placements` layouts.
    Migrated { placements: usize },
}

/// Copies the home cell from `template` into the pageset, once per layout.
///
/// Any existing button turns this into a no-op, so repeated calls are safe.
/// A pageset holding unrelated buttons but no home cell is skipped as well.
pub fn ensure_home_cell(conn: &mut Connection, template: &Path) -> Result<HomeCellOutcome, Error> {
    let board = resolve_board(conn)?;

    let existing_buttons: i64 = conn.query_row("SELECT COUNT(*) FROM Button", [], |row| row.get(0))?;
    if existing_buttons > 0 {
        log::warn!("Pageset already has {existing_buttons} button(s); not adding a home cell");
        return Ok(HomeCellOutcome::Skipped { existing_buttons });
    }

    if !template.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("home cell template not found: {}", template.display()),
        )));
    }

    // ATTACH/DETACH are not allowed inside a transaction.
    conn.execute(
        &format!("ATTACH DATABASE ?1 AS {TEMPLATE_SCHEMA}"),
        [template.to_string_lossy().into_owned()],
    )?;
    let migrated = copy_from_template(conn, &board);
    let detached = conn.execute_batch(&format!("DETACH DATABASE {TEMPLATE_SCHEMA}"));
    let placements = migrated?;
    detached?;

    log::info!("Added home cell to {placements} layout(s)");
    Ok(HomeCellOutcome::Migrated { placements })
}

fn copy_from_template(conn: &mut Connection, board: &Board) -> Result<usize, Error> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

    for table in ["Button", "ElementReference", "ElementPlacement", "CommandSequence"] {
        let copied = tx.execute(
            &format!("INSERT INTO main.{table} SELECT * FROM {TEMPLATE_SCHEMA}.{table}"),
            [],
        )?;
        log::debug!("Copied {copied} {table} row(s) from home template");
    }

    tx.execute(
        &format!(
            "UPDATE main.ElementReference SET PageId = ?1
             WHERE Id IN (SELECT Id FROM {TEMPLATE_SCHEMA}.ElementReference)"
        ),
        [board.id],
    )?;

    // Prefer the button labelled "Home"; otherwise the template's first button.
    let home_ref: Option<i64> = tx
        .query_row(
            &format!(
                "SELECT ElementReferenceId FROM {TEMPLATE_SCHEMA}.Button
                 ORDER BY (Label = ?1) DESC, Id LIMIT 1"
            ),
            [HOME_LABEL],
            |row| row.get(0),
        )
        .optional()?;
    let Some(home_ref) = home_ref else {
        tx.commit()?;
        return Ok(0);
    };

    let Some(original) = template_placement(&tx, home_ref)? else {
        tx.commit()?;
        return Ok(0);
    };

    for layout in &board.layouts {
        insert_placement(&tx, &original.for_layout(layout.id))?;
    }
    tx.execute("DELETE FROM main.ElementPlacement WHERE Id = ?1", [original.id])?;

    tx.commit()?;
    Ok(board.layouts.len())
}

/// The copied placement of the home cell, read back from the target.
fn template_placement(conn: &Connection, ref_id: i64) -> Result<Option<Placement>, Error> {
    let row = conn
        .query_row(
            &format!(
                "SELECT Id, GridPosition, GridSpan, CAST(Visible AS TEXT), ElementReferenceId, PageLayoutId
                 FROM main.ElementPlacement
                 WHERE ElementReferenceId = ?1
                   AND Id IN (SELECT Id FROM {TEMPLATE_SCHEMA}.ElementPlacement)
                 ORDER BY Id LIMIT 1"
            ),
            [ref_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            },
        )
        .optional()?;
    let Some((id, position, span, visible, element_reference_id, layout_id)) = row else {
        return Ok(None);
    };

    let position = GridPosition::parse(&position).ok_or_else(|| {
        Error::MalformedRow(format!("template placement {id} has grid position {position:?}"))
    })?;
    let span = span
        .as_deref()
        .and_then(GridSpan::parse)
        .unwrap_or(GridSpan::SINGLE);
    let visible = visible.is_none_or(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    Ok(Some(Placement {
        id: Some(id),
        position,
        span,
        visible,
        element_reference_id,
        layout_id,
    }))
}

fn insert_placement(conn: &Connection, placement: &Placement) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO main.ElementPlacement (GridPosition, GridSpan, Visible, ElementReferenceId, PageLayoutId)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            placement.position.to_string(),
            placement.span.to_string(),
            if placement.visible { "1" } else { "0" },
            placement.element_reference_id,
            placement.layout_id,
        ],
    )?;
    Ok(())
}
