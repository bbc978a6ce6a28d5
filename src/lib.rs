pub mod colour;
mod error;
pub mod model;
pub mod pageset;
pub mod pptx;

pub use colour::Palette;
pub use error::{CapacityShortfall, Error};
pub use model::ContentItem;
pub use pageset::{HomeCellOutcome, Pageset};
pub use pptx::SplitOptions;

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    pub split: SplitOptions,
    /// Layout ids to fill; `None` fills every layout of the content page.
    pub layouts: Option<Vec<i64>>,
    /// New name for the pageset and its content page.
    pub title: Option<String>,
    /// Pageset holding the home cell to copy in before content is added.
    pub home_template: Option<PathBuf>,
    pub palette: Palette,
}

#[derive(Clone, Debug)]
pub struct ConversionSummary {
    pub slides: usize,
    pub inserted: usize,
    pub existing_buttons: i64,
    pub home_cell: Option<HomeCellOutcome>,
}

/// Adds the speaker notes of `pptx` to a copy of `pageset`, written to `output`.
///
/// All work happens on a private working copy; `output` is only written once
/// every step has succeeded, and the working copy is removed either way.
pub fn convert_pptx_to_pageset(
    pptx: &Path,
    pageset: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<ConversionSummary, Error> {
    let t0 = Instant::now();

    let slides = pptx::extract_slides(pptx)?;
    let items = pptx::build_items(&slides, &options.split);
    if items.is_empty() {
        return Err(Error::NoContent);
    }
    let t_parse = t0.elapsed();

    let workdir = tempfile::Builder::new().prefix("pageset_").tempdir()?;
    let working_copy = workdir.path().join("working.spb");
    std::fs::copy(pageset, &working_copy).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", e, pageset.display()),
        ))
    })?;

    let summary = {
        let mut store = Pageset::open(&working_copy)?;
        let existing = store.existing_buttons()?;
        if existing.count > 0 {
            log::info!(
                "Pageset already has {} button(s), e.g. {}",
                existing.count,
                existing.samples.join(", ")
            );
        }

        let home_cell = match &options.home_template {
            Some(template) => Some(store.ensure_home_cell(template)?),
            None => None,
        };
        let inserted =
            store.insert_content(&items, options.layouts.as_deref(), &options.palette)?;
        if let Some(title) = &options.title {
            store.set_title(title)?;
        }
        store.refresh_timestamps()?;

        ConversionSummary {
            slides: slides.len(),
            inserted,
            existing_buttons: existing.count,
            home_cell,
        }
    };
    let t_store = t0.elapsed();

    std::fs::copy(&working_copy, output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, pageset={:.1}ms, write={:.1}ms, total={:.1}ms ({} cells)",
        t_parse.as_secs_f64() * 1000.0,
        (t_store - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_store).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        summary.inserted,
    );

    Ok(summary)
}
