#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use pptx_pageset::model::Layout;
use pptx_pageset::pageset::{PAGES_PER_LAYOUT, candidate_positions};
use rusqlite::{Connection, params};

const SCHEMA: &str = "
    CREATE TABLE Page (Id INTEGER PRIMARY KEY AUTOINCREMENT, Title TEXT, TimeStamp INTEGER,
        GridDimension TEXT);
    CREATE TABLE PageLayout (Id INTEGER PRIMARY KEY AUTOINCREMENT, PageId INTEGER,
        PageLayoutSetting TEXT);
    CREATE TABLE ElementReference (Id INTEGER PRIMARY KEY AUTOINCREMENT, ElementType INTEGER,
        ForegroundColor INTEGER, BackgroundColor INTEGER, AudioCueRecordingId INTEGER,
        PageId INTEGER);
    CREATE TABLE ElementPlacement (Id INTEGER PRIMARY KEY AUTOINCREMENT, GridPosition TEXT,
        GridSpan TEXT, Visible INTEGER, ElementReferenceId INTEGER, PageLayoutId INTEGER);
    CREATE TABLE Button (Id INTEGER PRIMARY KEY AUTOINCREMENT, Label TEXT, Message TEXT,
        ImageOwnership INTEGER, BorderColor INTEGER, BorderThickness REAL,
        LabelOwnership INTEGER, CommandFlags INTEGER, ContentType INTEGER, UniqueId TEXT,
        ElementReferenceId INTEGER, ActiveContentType INTEGER, LibrarySymbolId INTEGER,
        PageSetImageId INTEGER, SymbolColorDataId INTEGER, MessageRecordingId INTEGER);
    CREATE TABLE CommandSequence (Id INTEGER PRIMARY KEY AUTOINCREMENT,
        SerializedCommands TEXT, ButtonId INTEGER);
    CREATE TABLE Synchronization (Id INTEGER PRIMARY KEY, PageSetTimestamp INTEGER);
    CREATE TABLE PageSetProperties (Id INTEGER PRIMARY KEY, FriendlyName TEXT,
        TimeStamp INTEGER);
";

/// Blank pageset with chrome pages, one content page and one layout per `(columns, rows)`.
/// Returns the file and the content page's layouts in id order.
pub fn create_pageset(dir: &Path, name: &str, shapes: &[(u32, u32)]) -> (PathBuf, Vec<Layout>) {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(
        "INSERT INTO Page (Id, Title, TimeStamp) VALUES (1, 'Dashboard', 0), (2, 'Message Bar', 0),
             (3, 'Untitled', 0);
         INSERT INTO PageLayout (PageId, PageLayoutSetting) VALUES (1, '6,1,0,0');
         INSERT INTO Synchronization (Id, PageSetTimestamp) VALUES (1, 0);
         INSERT INTO PageSetProperties (Id, FriendlyName, TimeStamp) VALUES (1, 'Blank', 0);",
    )
    .unwrap();

    let mut layouts = Vec::new();
    for &(columns, rows) in shapes {
        conn.execute(
            "INSERT INTO PageLayout (PageId, PageLayoutSetting) VALUES (3, ?1)",
            [format!("{columns},{rows},0,0")],
        )
        .unwrap();
        layouts.push(Layout {
            id: conn.last_insert_rowid(),
            columns,
            rows,
        });
    }
    (path, layouts)
}

/// Template pageset with a single "Home" button placed once on a foreign layout.
pub fn create_home_template(dir: &Path) -> PathBuf {
    let path = dir.join("home_template.spb");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(
        "INSERT INTO Page (Id, Title) VALUES (99, 'Home page');
         INSERT INTO ElementReference (Id, ElementType, ForegroundColor, BackgroundColor,
             AudioCueRecordingId, PageId) VALUES (1, 0, -14934754, 4294967295, 0, 99);
         INSERT INTO Button (Id, Label, Message, ImageOwnership, LabelOwnership, CommandFlags,
             ContentType, UniqueId, ElementReferenceId) VALUES (1, 'Home', '', 3, 3, 0, 6, 'home', 1);
         INSERT INTO ElementPlacement (Id, GridPosition, GridSpan, Visible, ElementReferenceId,
             PageLayoutId) VALUES (1, '3,4', '1,1', '1', 1, 77);
         INSERT INTO CommandSequence (Id, SerializedCommands, ButtonId)
             VALUES (1, '{\"$type\":\"1\",\"$values\":[{\"$type\":\"9\"}]}', 1);",
    )
    .unwrap();
    path
}

/// Fills the first `n` free cells of `layout` with placeholder placements.
pub fn occupy(path: &Path, layout: &Layout, n: usize) {
    let conn = Connection::open(path).unwrap();
    for pos in candidate_positions(layout.columns, layout.rows, PAGES_PER_LAYOUT)
        .into_iter()
        .take(n)
    {
        conn.execute(
            "INSERT INTO ElementPlacement (GridPosition, GridSpan, Visible, ElementReferenceId,
                 PageLayoutId) VALUES (?1, '1,1', '1', 0, ?2)",
            params![pos.to_string(), layout.id],
        )
        .unwrap();
    }
}

pub fn count(path: &Path, sql: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

pub struct TestSlide<'a> {
    pub title: Option<&'a str>,
    pub notes: Option<&'a str>,
}

const PML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

fn text_body(text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                "<a:p/>".to_string()
            } else {
                format!("<a:p><a:r><a:t>{line}</a:t></a:r></a:p>")
            }
        })
        .collect();
    format!("<p:txBody><a:bodyPr/>{paragraphs}</p:txBody>")
}

fn placeholder_shape(kind: &str, text: &str) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"{kind}\"/><p:cNvSpPr/><p:nvPr><p:ph type=\"{kind}\"/></p:nvPr></p:nvSpPr>{}</p:sp>",
        text_body(text)
    )
}

fn put(zip: &mut zip::ZipWriter<Cursor<Vec<u8>>>, name: &str, body: String) {
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    zip.start_file(name, options).unwrap();
    zip.write_all(body.as_bytes()).unwrap();
}

/// A minimal presentation: one slide part per entry, plus a notes part where notes are given.
pub fn build_pptx(slides: &[TestSlide]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

    let ids: String = (1..=slides.len())
        .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{i}\"/>", 255 + i))
        .collect();
    put(
        &mut zip,
        "ppt/presentation.xml",
        format!("<p:presentation xmlns:p=\"{PML}\" xmlns:r=\"{REL}\"><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"),
    );
    let rels: String = (1..=slides.len())
        .map(|i| {
            format!("<Relationship Id=\"rId{i}\" Type=\"{REL}/slide\" Target=\"slides/slide{i}.xml\"/>")
        })
        .collect();
    put(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        format!("<Relationships xmlns=\"{PKG_REL}\">{rels}</Relationships>"),
    );

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        let shapes = slide
            .title
            .map(|t| placeholder_shape("title", t))
            .unwrap_or_default();
        put(
            &mut zip,
            &format!("ppt/slides/slide{n}.xml"),
            format!("<p:sld xmlns:p=\"{PML}\" xmlns:a=\"{DML}\"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"),
        );
        let Some(notes) = slide.notes else {
            continue;
        };
        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            format!(
                "<Relationships xmlns=\"{PKG_REL}\"><Relationship Id=\"rId2\" Type=\"{REL}/notesSlide\" Target=\"../notesSlides/notesSlide{n}.xml\"/></Relationships>"
            ),
        );
        put(
            &mut zip,
            &format!("ppt/notesSlides/notesSlide{n}.xml"),
            format!(
                "<p:notes xmlns:p=\"{PML}\" xmlns:a=\"{DML}\"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:notes>",
                placeholder_shape("body", notes)
            ),
        );
    }

    zip.finish().unwrap().into_inner()
}
