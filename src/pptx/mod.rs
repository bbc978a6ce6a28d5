mod notes;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::Slide;

pub use notes::{LabelFormat, SplitLevel, SplitOptions, button_label, build_items, split_notes};

const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NOTES_SLIDE_REL: &str = "/notesSlide";

struct Relationship {
    target: String,
    kind: String,
}

pub fn extract_slides(path: &Path) -> Result<Vec<Slide>, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    extract(file)
}

pub fn extract_slides_from_bytes(data: &[u8]) -> Result<Vec<Slide>, Error> {
    extract(Cursor::new(data))
}

fn extract<R: Read + Seek>(reader: R) -> Result<Vec<Slide>, Error> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|_| Error::InvalidPptx("file is not a ZIP archive".into()))?;

    let presentation = read_zip_text(&mut zip, "ppt/presentation.xml").ok_or_else(|| {
        Error::InvalidPptx("missing ppt/presentation.xml (is this a PPTX file?)".into())
    })?;
    let rels = part_relationships(&mut zip, "ppt/presentation.xml");

    let xml = roxmltree::Document::parse(&presentation)?;
    let slide_parts: Vec<String> = xml
        .root_element()
        .children()
        .filter(|n| is_pml(*n, "sldIdLst"))
        .flat_map(|list| list.children())
        .filter(|n| is_pml(*n, "sldId"))
        .filter_map(|n| n.attribute((REL_NS, "id")))
        .filter_map(|rid| rels.get(rid))
        .map(|rel| resolve_target("ppt/presentation.xml", &rel.target))
        .collect();

    let mut slides = Vec::with_capacity(slide_parts.len());
    for (i, part) in slide_parts.iter().enumerate() {
        let number = i as u32 + 1;
        let Some(slide_xml) = read_zip_text(&mut zip, part) else {
            log::warn!("Slide {number}: part {part} is missing, skipping");
            continue;
        };
        let title = placeholder_text(&slide_xml, &["title", "ctrTitle"])?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Slide {number}"));

        let notes_part = part_relationships(&mut zip, part)
            .into_values()
            .find(|rel| rel.kind.ends_with(NOTES_SLIDE_REL))
            .map(|rel| resolve_target(part, &rel.target));
        let notes = match notes_part.and_then(|p| read_zip_text(&mut zip, &p)) {
            Some(notes_xml) => placeholder_text(&notes_xml, &["body"])?
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            None => String::new(),
        };

        log::debug!("Slide {number}: {title:?}, {} chars of notes", notes.len());
        slides.push(Slide {
            number,
            title,
            notes,
        });
    }

    log::info!("Extracted {} slide(s)", slides.len());
    Ok(slides)
}

fn is_pml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(PML_NS)
}

fn is_dml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(DML_NS)
}

fn pml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_pml(*n, name))
}

/// Text of the first shape whose placeholder type is one of `types`.
fn placeholder_text(xml_content: &str, types: &[&str]) -> Result<Option<String>, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let shape = xml.descendants().filter(|n| is_pml(*n, "sp")).find(|sp| {
        pml(*sp, "nvSpPr")
            .and_then(|nv| pml(nv, "nvPr"))
            .and_then(|nv| pml(nv, "ph"))
            .and_then(|ph| ph.attribute("type"))
            .is_some_and(|t| types.contains(&t))
    });
    Ok(shape.and_then(|sp| pml(sp, "txBody")).map(text_body))
}

/// Paragraphs joined by `\n`; `a:br` also breaks the line.
fn text_body(body: roxmltree::Node) -> String {
    let paragraphs: Vec<String> = body
        .children()
        .filter(|n| is_dml(*n, "p"))
        .map(|p| {
            let mut text = String::new();
            for node in p.descendants() {
                if is_dml(node, "t") {
                    text.push_str(node.text().unwrap_or(""));
                } else if is_dml(node, "br") {
                    text.push('\n');
                }
            }
            text
        })
        .collect();
    paragraphs.join("\n")
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut entry = zip.by_name(name).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, Relationship> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(
                id.to_string(),
                Relationship {
                    target: target.to_string(),
                    kind: node.attribute("Type").unwrap_or("").to_string(),
                },
            );
        }
    }
    rels
}

/// Load relationships for a part like "ppt/slides/slide1.xml" → "ppt/slides/_rels/slide1.xml.rels"
fn part_relationships<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    part_path: &str,
) -> HashMap<String, Relationship> {
    let (dir, file) = match part_path.rsplit_once('/') {
        Some((d, f)) => (d, f),
        None => ("", part_path),
    };
    let rels_path = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };
    let Some(xml_content) = read_zip_text(zip, &rels_path) else {
        return HashMap::new();
    };
    parse_rels_xml(&xml_content)
}

/// Resolves a relationship target against the directory of the part that owns it.
fn resolve_target(part_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match part_path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
