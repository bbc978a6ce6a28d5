use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::model::{ContentItem, Slide};

/// How finely a slide's notes are cut into cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplitLevel {
    Whole,
    #[default]
    Paragraphs,
    Lines,
    Sentences,
}

impl SplitLevel {
    /// Levels 1-4, coarse to fine.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Whole),
            2 => Some(Self::Paragraphs),
            3 => Some(Self::Lines),
            4 => Some(Self::Sentences),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelFormat {
    /// "Title (N)"
    #[default]
    TitlePart,
    /// "Slide N: content..."
    SlideContent,
    /// "content..."
    ContentOnly,
    /// "N - Title"
    NumTitle,
    /// "N.P: content..."
    NumPartContent,
}

impl FromStr for LabelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title-part" => Ok(Self::TitlePart),
            "slide-content" => Ok(Self::SlideContent),
            "content-only" => Ok(Self::ContentOnly),
            "num-title" => Ok(Self::NumTitle),
            "num-part-content" => Ok(Self::NumPartContent),
            other => Err(format!(
                "unknown label format {other:?} (expected title-part, slide-content, content-only, num-title or num-part-content)"
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub default_level: SplitLevel,
    /// Per-slide overrides keyed by 1-based slide number.
    pub overrides: HashMap<u32, SplitLevel>,
    pub label_format: LabelFormat,
    pub max_label_length: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            default_level: SplitLevel::default(),
            overrides: HashMap::new(),
            label_format: LabelFormat::default(),
            max_label_length: 30,
        }
    }
}

/// Two line breaks with only whitespace between them.
static PARAGRAPH_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\n\s*\n").ok());
/// A full stop followed by whitespace; the stop is dropped with the separator.
static SENTENCE_END: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\.(?:\s+|\n+)").ok());

pub fn split_notes(notes: &str, level: SplitLevel) -> Vec<String> {
    let notes = notes.trim();
    if notes.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<String> = match level {
        SplitLevel::Whole => return vec![notes.to_string()],
        SplitLevel::Paragraphs => split_on(notes, PARAGRAPH_BREAK.as_ref()),
        SplitLevel::Lines => notes
            .split('\n')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        SplitLevel::Sentences => split_on(notes, SENTENCE_END.as_ref())
            .into_iter()
            .map(|c| if c.ends_with('.') { c } else { c + "." })
            .collect(),
    };

    if chunks.is_empty() {
        vec![notes.to_string()]
    } else {
        chunks
    }
}

fn split_on(notes: &str, pattern: Option<&Regex>) -> Vec<String> {
    let pieces: Vec<&str> = match pattern {
        Some(re) => re.split(notes).collect(),
        None => vec![notes],
    };
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// First `max` characters plus "..." when `text` is longer than `limit`.
fn truncate(text: &str, limit: usize, max: usize) -> String {
    if text.chars().count() > limit {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

fn preview(text: &str, limit: usize) -> String {
    truncate(text, limit, limit).replace('\n', " ").trim().to_string()
}

/// Label for chunk `index` (0-based) of `total` from slide `slide_number`.
pub fn button_label(
    format: LabelFormat,
    title: &str,
    index: usize,
    total: usize,
    slide_number: u32,
    content: &str,
    max_length: usize,
) -> String {
    match format {
        LabelFormat::TitlePart => {
            let title = truncate(title, max_length, max_length.saturating_sub(3));
            if total > 1 {
                format!("{title} ({})", index + 1)
            } else {
                title
            }
        }
        LabelFormat::SlideContent => {
            format!(
                "Slide {slide_number}: {}",
                preview(content, max_length.saturating_sub(10))
            )
        }
        LabelFormat::ContentOnly => preview(content, max_length),
        LabelFormat::NumTitle => {
            let limit = max_length.saturating_sub(5);
            format!("{slide_number} - {}", truncate(title, limit, limit))
        }
        LabelFormat::NumPartContent => {
            let prefix = if total > 1 {
                format!("{slide_number}.{}: ", index + 1)
            } else {
                format!("{slide_number}: ")
            };
            let remaining = max_length.saturating_sub(prefix.chars().count());
            format!("{prefix}{}", preview(content, remaining))
        }
    }
}

/// One item per note chunk, grouped by slide number. Slides without notes are skipped.
pub fn build_items(slides: &[Slide], options: &SplitOptions) -> Vec<ContentItem> {
    let mut items = Vec::new();
    for slide in slides {
        if slide.notes.is_empty() {
            continue;
        }
        let level = options
            .overrides
            .get(&slide.number)
            .copied()
            .unwrap_or(options.default_level);
        let chunks = split_notes(&slide.notes, level);
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let label = button_label(
                options.label_format,
                &slide.title,
                i,
                total,
                slide.number,
                &chunk,
                options.max_label_length,
            );
            items.push(ContentItem::new(label, chunk, slide.number));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTES: &str = "First point. Still first.\nSecond line\n\n  \nNew paragraph here.";

    #[test]
    fn whole_keeps_everything() {
        assert_eq!(split_notes(NOTES, SplitLevel::Whole), vec![NOTES.to_string()]);
        assert!(split_notes("  \n ", SplitLevel::Whole).is_empty());
    }

    #[test]
    fn paragraphs_need_a_blank_line() {
        assert_eq!(
            split_notes(NOTES, SplitLevel::Paragraphs),
            vec![
                "First point. Still first.\nSecond line".to_string(),
                "New paragraph here.".to_string(),
            ]
        );
        assert_eq!(
            split_notes("a\r\n\r\nb", SplitLevel::Paragraphs),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn lines_drop_blank_lines() {
        assert_eq!(
            split_notes(NOTES, SplitLevel::Lines),
            vec![
                "First point. Still first.",
                "Second line",
                "New paragraph here.",
            ]
        );
    }

    #[test]
    fn sentences_keep_their_full_stop() {
        assert_eq!(
            split_notes(NOTES, SplitLevel::Sentences),
            vec![
                "First point.",
                "Still first.",
                "Second line\n\n  \nNew paragraph here.",
            ]
        );
        assert_eq!(
            split_notes("No stop at all", SplitLevel::Sentences),
            vec!["No stop at all."]
        );
        assert_eq!(
            split_notes("Version 1.2 is out. Done", SplitLevel::Sentences),
            vec!["Version 1.2 is out.", "Done."]
        );
    }

    #[test]
    fn separators_span_mixed_whitespace() {
        assert_eq!(
            split_notes("one\n\t \n\ntwo\nstill two", SplitLevel::Paragraphs),
            vec!["one".to_string(), "two\nstill two".to_string()]
        );
        assert_eq!(
            split_notes("Stop.\nNext.\t\tLast", SplitLevel::Sentences),
            vec!["Stop.", "Next.", "Last."]
        );
        // A lone line break is not a paragraph break.
        assert_eq!(
            split_notes("one\ntwo", SplitLevel::Paragraphs),
            vec!["one\ntwo".to_string()]
        );
    }

    #[test]
    fn split_levels_from_numbers() {
        assert_eq!(SplitLevel::from_level(1), Some(SplitLevel::Whole));
        assert_eq!(SplitLevel::from_level(4), Some(SplitLevel::Sentences));
        assert_eq!(SplitLevel::from_level(5), None);
    }

    #[test]
    fn title_part_labels() {
        let long = "A title that is clearly much longer than thirty";
        assert_eq!(
            button_label(LabelFormat::TitlePart, "Intro", 1, 3, 1, "", 30),
            "Intro (2)"
        );
        assert_eq!(
            button_label(LabelFormat::TitlePart, "Intro", 0, 1, 1, "", 30),
            "Intro"
        );
        let label = button_label(LabelFormat::TitlePart, long, 0, 1, 1, "", 30);
        assert_eq!(label.chars().count(), 30);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn content_labels() {
        let content = "Welcome everyone\nto the talk about grids";
        assert_eq!(
            button_label(LabelFormat::NumPartContent, "", 1, 2, 3, content, 20),
            "3.2: Welcome everyon..."
        );
        assert_eq!(
            button_label(LabelFormat::NumPartContent, "", 0, 1, 3, "Short", 20),
            "3: Short"
        );
        assert_eq!(
            button_label(LabelFormat::ContentOnly, "", 0, 1, 1, "two\nlines", 30),
            "two lines"
        );
        assert_eq!(
            button_label(LabelFormat::SlideContent, "", 0, 1, 7, content, 20),
            "Slide 7: Welcome ev..."
        );
        assert_eq!(
            button_label(LabelFormat::NumTitle, "Agenda", 0, 1, 2, "", 30),
            "2 - Agenda"
        );
    }

    #[test]
    fn label_formats_parse() {
        assert_eq!("num-title".parse::<LabelFormat>(), Ok(LabelFormat::NumTitle));
        assert!("fancy".parse::<LabelFormat>().is_err());
    }

    #[test]
    fn items_follow_slide_order_and_overrides() {
        let slides = vec![
            Slide {
                number: 1,
                title: "Intro".into(),
                notes: "One.\n\nTwo.".into(),
            },
            Slide {
                number: 2,
                title: "Empty".into(),
                notes: String::new(),
            },
            Slide {
                number: 3,
                title: "Outro".into(),
                notes: "Bye. See you.".into(),
            },
        ];
        let mut options = SplitOptions::default();
        options.overrides.insert(3, SplitLevel::Sentences);

        let items = build_items(&slides, &options);
        assert_eq!(
            items,
            vec![
                ContentItem::new("Intro (1)", "One.", 1),
                ContentItem::new("Intro (2)", "Two.", 1),
                ContentItem::new("Outro (1)", "Bye.", 3),
                ContentItem::new("Outro (2)", "See you.", 3),
            ]
        );
    }
}
