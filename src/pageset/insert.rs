use std::time::Instant;

use rusqlite::{Connection, TransactionBehavior, params};

use super::capacity::plan_capacity;
use super::grid::available_positions;
use super::{BUTTON_TABLE, ELEMENT_REFERENCE_TABLE, next_id, resolve_board, select_layouts};
use crate::colour::Palette;
use crate::error::Error;
use crate::model::{ContentItem, GridPosition, GridSpan};

/// Command payload attached to every new button: speak its message.
pub const SPEAK_MESSAGE_COMMAND: &str = r#"{"$type":"1","$values":[{"$type":"3","MessageAction":0}]}"#;

const FOREGROUND_COLOUR: i64 = -14934754;
const BORDER_COLOUR: i64 = -132102;
const COMMAND_FLAGS: i64 = 8;
const CONTENT_TYPE: i64 = 6;
/// `LabelOwnership` of a button that carries its own label, even an empty one.
const OWNED: i64 = 3;

/// Writes `items` as new cells on the content page, mirrored into each
/// targeted layout (all layouts when `target_layouts` is `None`).
///
/// Runs as one exclusive transaction: the capacity check happens before the
/// first write, and any failure rolls every row of the batch back and is
/// returned unchanged. Item `i` gets button id `b0 + i` and element reference
/// id `r0 + i`, where `b0`/`r0` are read once from the id sequence.
pub fn insert_content(
    conn: &mut Connection,
    items: &[ContentItem],
    target_layouts: Option<&[i64]>,
    palette: &Palette,
) -> Result<usize, Error> {
    if items.is_empty() {
        return Ok(0);
    }
    let t0 = Instant::now();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

    let board = resolve_board(&tx)?;
    let layouts = select_layouts(&board, target_layouts)?;
    let plan = plan_capacity(&tx, &layouts, items.len())?;
    log::debug!(
        "Capacity ok: {} needed, {} free in layout {}",
        plan.required,
        plan.available,
        plan.limiting_layout
    );

    let first_button_id = next_id(&tx, BUTTON_TABLE)?;
    let first_ref_id = next_id(&tx, ELEMENT_REFERENCE_TABLE)?;

    for (i, item) in items.iter().enumerate() {
        let button_id = first_button_id + i as i64;
        let ref_id = first_ref_id + i as i64;
        log::debug!("Adding button {button_id}: {:?} (group {})", item.label, item.group);

        insert_button(&tx, button_id, ref_id, item)?;
        insert_speak_command(&tx, button_id)?;
        insert_element_reference(&tx, ref_id, board.id, palette.colour_for(item.group))?;
    }

    for layout in &layouts {
        let free = available_positions(&tx, layout)?;
        for (i, position) in free.iter().take(items.len()).enumerate() {
            insert_placement(&tx, layout.id, first_ref_id + i as i64, *position)?;
        }
        log::debug!("Placed {} cells on layout {}", items.len(), layout.id);
    }

    tx.commit()?;

    log::info!(
        "Inserted {} cells into {} layout(s) in {:.1}ms",
        items.len(),
        layouts.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(items.len())
}

/// The message field is single-line; line breaks become spaces.
fn normalize_message(message: &str) -> String {
    message.replace(['\n', '\r'], " ")
}

fn insert_button(
    conn: &Connection,
    id: i64,
    ref_id: i64,
    item: &ContentItem,
) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO Button (Id, Label, Message, ImageOwnership, BorderColor, BorderThickness,
             LabelOwnership, CommandFlags, ContentType, UniqueId, ElementReferenceId,
             ActiveContentType, LibrarySymbolId, PageSetImageId, SymbolColorDataId, MessageRecordingId)
         VALUES (?1, ?2, ?3, 0, ?4, 0.0, ?5, ?6, ?7, ?8, ?9, 0, NULL, 0, 0, 0)",
        params![
            id,
            item.label,
            normalize_message(&item.message),
            BORDER_COLOUR,
            OWNED,
            COMMAND_FLAGS,
            CONTENT_TYPE,
            uuid::Uuid::new_v4().to_string(),
            ref_id,
        ],
    )?;
    Ok(())
}

fn insert_speak_command(conn: &Connection, button_id: i64) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO CommandSequence (SerializedCommands, ButtonId) VALUES (?1, ?2)",
        params![SPEAK_MESSAGE_COMMAND, button_id],
    )?;
    Ok(())
}

fn insert_element_reference(
    conn: &Connection,
    id: i64,
    board_id: i64,
    background: u32,
) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO ElementReference
             (Id, ElementType, ForegroundColor, BackgroundColor, AudioCueRecordingId, PageId)
         VALUES (?1, 0, ?2, ?3, 0, ?4)",
        params![id, FOREGROUND_COLOUR, i64::from(background), board_id],
    )?;
    Ok(())
}

fn insert_placement(
    conn: &Connection,
    layout_id: i64,
    ref_id: i64,
    position: GridPosition,
) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO ElementPlacement (GridPosition, GridSpan, Visible, ElementReferenceId, PageLayoutId)
         VALUES (?1, ?2, '1', ?3, ?4)",
        params![
            position.to_string(),
            GridSpan::SINGLE.to_string(),
            ref_id,
            layout_id
        ],
    )?;
    Ok(())
}
