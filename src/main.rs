use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pptx_pageset::pptx::{self, LabelFormat, SplitLevel, SplitOptions};
use pptx_pageset::{ConvertOptions, Error, HomeCellOutcome, Pageset};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Pageset(#[from] Error),
    #[error("could not render the report as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser)]
#[command(version, about = "Turn PowerPoint speaker notes into pageset cells")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add the notes of a presentation to a copy of a blank pageset
    Convert {
        /// Presentation whose speaker notes become cells
        pptx: PathBuf,
        /// Blank (or partly filled) pageset to start from; left untouched
        pageset: PathBuf,
        /// Where to write the finished pageset
        #[arg(short, long)]
        output: PathBuf,
        /// Pageset holding the home cell to copy in
        #[arg(long)]
        home_template: Option<PathBuf>,
        /// New pageset title
        #[arg(long)]
        title: Option<String>,
        /// Only fill these layout ids (repeatable)
        #[arg(long = "layout")]
        layouts: Vec<i64>,
        #[command(flatten)]
        split: SplitArgs,
    },
    /// Show free and occupied cells per layout
    Capacity {
        pageset: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the cells a presentation would produce
    Preview {
        pptx: PathBuf,
        #[command(flatten)]
        split: SplitArgs,
    },
}

#[derive(clap::Args)]
struct SplitArgs {
    /// 1 whole note, 2 paragraphs, 3 lines, 4 sentences
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    split_level: u8,
    /// Per-slide split level, as SLIDE=LEVEL (repeatable)
    #[arg(long = "split", value_parser = parse_override)]
    overrides: Vec<(u32, SplitLevel)>,
    /// title-part, slide-content, content-only, num-title or num-part-content
    #[arg(long, default_value = "title-part")]
    label_format: LabelFormat,
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(10..=60))]
    max_label_length: u16,
}

impl SplitArgs {
    fn options(&self) -> SplitOptions {
        SplitOptions {
            default_level: SplitLevel::from_level(self.split_level).unwrap_or_default(),
            overrides: self.overrides.iter().copied().collect(),
            label_format: self.label_format,
            max_label_length: usize::from(self.max_label_length),
        }
    }
}

fn parse_override(arg: &str) -> Result<(u32, SplitLevel), String> {
    let (slide, level) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SLIDE=LEVEL, got {arg:?}"))?;
    let slide: u32 = slide
        .trim()
        .parse()
        .map_err(|_| format!("bad slide number {slide:?}"))?;
    let level = level
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(SplitLevel::from_level)
        .ok_or_else(|| format!("split level must be 1-4, got {level:?}"))?;
    Ok((slide, level))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, CliError::Pageset(Error::Capacity(_))) {
                eprintln!("Try a coarser split level, or start from a pageset with a larger grid.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Convert {
            pptx,
            pageset,
            output,
            home_template,
            title,
            layouts,
            split,
        } => {
            let options = ConvertOptions {
                split: split.options(),
                layouts: (!layouts.is_empty()).then_some(layouts),
                title,
                home_template,
                ..ConvertOptions::default()
            };
            let summary = pptx_pageset::convert_pptx_to_pageset(&pptx, &pageset, &output, &options)?;
            if let Some(HomeCellOutcome::Migrated { placements }) = summary.home_cell {
                println!("Home cell added to {placements} layout(s)");
            }
            println!(
                "Added {} cells from {} slides to {}",
                summary.inserted,
                summary.slides,
                output.display()
            );
        }
        Command::Capacity { pageset, json } => {
            let report = Pageset::open_read_only(&pageset)?.capacity_report()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            println!(
                "Content page {}: {} pages per layout, {} reserved cells",
                report.board_id, report.pages, report.reserved_cells
            );
            for layout in &report.layouts {
                let marker = if report.limiting_layout == Some(layout.id) { " *" } else { "" };
                println!(
                    "  layout {:>4}: {}x{} ({} per page), {} free, {} occupied{marker}",
                    layout.id,
                    layout.columns,
                    layout.rows,
                    layout.cells_per_page,
                    layout.free_cells,
                    layout.occupied_cells
                );
            }
            println!("Room for {} new cells", report.available_cells);
        }
        Command::Preview { pptx: path, split } => {
            let slides = pptx::extract_slides(&path)?;
            let items = pptx::build_items(&slides, &split.options());
            for item in &items {
                println!("[slide {}] {}", item.group, item.label);
                println!("    {}", item.message.replace('\n', " "));
            }
            println!("{} cells from {} slides", items.len(), slides.len());
        }
    }
    Ok(())
}
