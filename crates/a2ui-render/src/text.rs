#![forbid(unsafe_code)]

//! Plain-text outline target.
//!
//! Renders a response as an indented outline, one line per component plus
//! detail lines for list items and table rows:
//!
//! ```text
//! container (vertical)  #root
//! ├── text "Ada"  #header
//! └── [ Refresh ]  #refresh
//! ```
//!
//! Widths are measured with `unicode-width` so wide glyphs truncate and
//! align correctly.

use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::registry::Registry;
use crate::render::{RenderOutcome, Renderer, ResolvedComponent};

/// Longest quoted text shown on one line, in terminal cells.
const MAX_TEXT_WIDTH: usize = 48;

/// Guide characters for the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineGuides {
    /// `|   `, `+-- `, `` `-- ``.
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
}

impl OutlineGuides {
    const fn vertical(self) -> &'static str {
        match self {
            Self::Ascii => "|   ",
            Self::Unicode => "\u{2502}   ",
        }
    }

    const fn branch(self) -> &'static str {
        match self {
            Self::Ascii => "+-- ",
            Self::Unicode => "\u{251C}\u{2500}\u{2500} ",
        }
    }

    const fn last(self) -> &'static str {
        match self {
            Self::Ascii => "`-- ",
            Self::Unicode => "\u{2514}\u{2500}\u{2500} ",
        }
    }

    const fn space(self) -> &'static str {
        "    "
    }
}

/// A rendered block of outline lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub lines: Vec<String>,
}

impl TextBlock {
    #[must_use]
    pub fn leaf(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    /// `head` followed by `children`, each indented under a guide.
    #[must_use]
    pub fn branch(head: impl Into<String>, children: Vec<TextBlock>, guides: OutlineGuides) -> Self {
        let mut lines = vec![head.into()];
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i + 1 == count;
            for (j, line) in child.lines.into_iter().enumerate() {
                let prefix = match (j, is_last) {
                    (0, false) => guides.branch(),
                    (0, true) => guides.last(),
                    (_, false) => guides.vertical(),
                    (_, true) => guides.space(),
                };
                lines.push(format!("{prefix}{line}"));
            }
        }
        Self { lines }
    }

    /// Widest line in terminal cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lines.iter().map(|l| l.width()).max().unwrap_or(0)
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// `text` cut to `max` cells, ending in `…` when shortened.
#[must_use]
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('\u{2026}');
    out
}

/// `text` padded with spaces to `width` cells.
fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    for _ in text.width()..width {
        out.push(' ');
    }
    out
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", truncate_to_width(text, MAX_TEXT_WIDTH))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn headline(c: &ResolvedComponent<'_>, body: String) -> String {
    let mut line = body;
    if let Some(label) = c.accessibility().and_then(|a| a.label.as_deref()) {
        line.push_str(&format!(" aria={}", quoted(label)));
    }
    format!("{line}  #{}", c.id())
}

// ── Factories ────────────────────────────────────────────────────────────

fn text_line(c: &ResolvedComponent<'_>) -> String {
    let content = c.prop("content").map(scalar).unwrap_or_default();
    match c.prop_str("variant") {
        Some(variant) if variant != "body" => format!("text.{variant} {}", quoted(&content)),
        _ => format!("text {}", quoted(&content)),
    }
}

fn container_line(c: &ResolvedComponent<'_>) -> String {
    let layout = c.prop_str("layout").unwrap_or("vertical");
    format!("container ({layout})")
}

fn card_line(c: &ResolvedComponent<'_>) -> String {
    match c.prop_str("title") {
        Some(title) => format!("card {}", quoted(title)),
        None => "card".to_string(),
    }
}

fn button_line(c: &ResolvedComponent<'_>) -> String {
    let label = c.prop("label").map(scalar).unwrap_or_default();
    let mut line = format!("[ {} ]", truncate_to_width(&label, MAX_TEXT_WIDTH));
    if c.prop_bool("disabled") {
        line.push_str(" (disabled)");
    }
    line
}

fn chip_line(c: &ResolvedComponent<'_>) -> String {
    let label = c.prop("label").map(scalar).unwrap_or_default();
    format!("({})", truncate_to_width(&label, MAX_TEXT_WIDTH))
}

fn link_line(c: &ResolvedComponent<'_>) -> String {
    let href = c.prop_str("href").unwrap_or("");
    let label = c.prop("label").map(scalar).unwrap_or_else(|| href.to_string());
    format!("link {} <{href}>", quoted(&label))
}

fn image_line(c: &ResolvedComponent<'_>) -> String {
    let src = c.prop_str("src").unwrap_or("");
    match c.prop_str("alt") {
        Some(alt) => format!("image {} <{src}>", quoted(alt)),
        None => format!("image <{src}>"),
    }
}

fn input_line(c: &ResolvedComponent<'_>) -> String {
    let value = c.prop("value").map(scalar).unwrap_or_default();
    let shown = if value.is_empty() {
        c.prop_str("placeholder").unwrap_or("").to_string()
    } else {
        value
    };
    format!("input [{}]", truncate_to_width(&shown, MAX_TEXT_WIDTH))
}

fn chart_line(c: &ResolvedComponent<'_>) -> String {
    let kind = c.prop_str("chartType").unwrap_or("chart");
    let series = c
        .prop("data")
        .and_then(|d| d.get("datasets"))
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    match c.prop_str("title") {
        Some(title) => format!("chart {kind} {} ({series} series)", quoted(title)),
        None => format!("chart {kind} ({series} series)"),
    }
}

fn list_items(c: &ResolvedComponent<'_>) -> Vec<TextBlock> {
    let Some(items) = c.prop("items").and_then(Value::as_array) else {
        return Vec::new();
    };
    let checklist = c.prop_str("variant") == Some("checklist");
    items
        .iter()
        .map(|item| {
            let text = item
                .get("text")
                .map(scalar)
                .unwrap_or_else(|| scalar(item));
            let text = truncate_to_width(&text, MAX_TEXT_WIDTH);
            if !checklist {
                return TextBlock::leaf(format!("- {text}"));
            }
            let mark = match item.get("status").and_then(Value::as_str) {
                Some("completed") => "[x]",
                Some("in-progress") => "[~]",
                _ => "[ ]",
            };
            TextBlock::leaf(format!("{mark} {text}"))
        })
        .collect()
}

fn table_rows(c: &ResolvedComponent<'_>) -> (String, Vec<TextBlock>) {
    let columns: Vec<(String, String)> = c
        .prop("columns")
        .and_then(Value::as_array)
        .map(|cols| {
            cols.iter()
                .map(|col| {
                    let key = col.get("key").map(scalar).unwrap_or_default();
                    let label = col.get("label").map(scalar).unwrap_or_else(|| key.clone());
                    (key, label)
                })
                .collect()
        })
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = c
        .prop("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|(key, _)| {
                            let cell = row.get(key).map(scalar).unwrap_or_default();
                            truncate_to_width(&cell, MAX_TEXT_WIDTH)
                        })
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            rows.iter()
                .map(|r| r[i].width())
                .chain(std::iter::once(label.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let join = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| pad_to_width(cell, w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let head = format!("table ({} rows)", rows.len());
    let mut blocks = Vec::with_capacity(rows.len() + 1);
    if !columns.is_empty() {
        blocks.push(TextBlock::leaf(join(
            columns.iter().map(|(_, label)| label.clone()).collect(),
        )));
    }
    blocks.extend(rows.into_iter().map(|r| TextBlock::leaf(join(r))));
    (head, blocks)
}

/// Registry with outline factories for the built-in component types.
#[must_use]
pub fn text_registry(guides: OutlineGuides) -> Registry<TextBlock> {
    let mut registry: Registry<TextBlock> =
        Registry::new(move |c: &ResolvedComponent<'_>, children: Vec<TextBlock>| {
            let head = headline(c, format!("<unknown type {:?}>", c.kind()));
            TextBlock::branch(head, children, guides)
        });

    let simple: [(&str, fn(&ResolvedComponent<'_>) -> String); 9] = [
        ("text", text_line),
        ("container", container_line),
        ("card", card_line),
        ("button", button_line),
        ("chip", chip_line),
        ("link", link_line),
        ("image", image_line),
        ("input", input_line),
        ("chart", chart_line),
    ];
    for (kind, line) in simple {
        registry.register(
            kind,
            move |c: &ResolvedComponent<'_>, children: Vec<TextBlock>| {
                TextBlock::branch(headline(c, line(c)), children, guides)
            },
        );
    }

    registry.register(
        "list",
        move |c: &ResolvedComponent<'_>, children: Vec<TextBlock>| {
            let mut blocks = list_items(c);
            let head = headline(c, format!("list ({} items)", blocks.len()));
            blocks.extend(children);
            TextBlock::branch(head, blocks, guides)
        },
    );
    registry.register(
        "data-table",
        move |c: &ResolvedComponent<'_>, children: Vec<TextBlock>| {
            let (head, mut blocks) = table_rows(c);
            blocks.extend(children);
            TextBlock::branch(headline(c, head), blocks, guides)
        },
    );
    registry
}

/// Renderer over [`text_registry`] with the default policy.
#[must_use]
pub fn text_renderer(guides: OutlineGuides) -> Renderer<TextBlock> {
    Renderer::new(text_registry(guides))
}

/// Outline text of a finished walk; empty when nothing rendered.
#[must_use]
pub fn outline(outcome: &RenderOutcome<TextBlock>) -> String {
    outcome
        .root
        .as_ref()
        .map(TextBlock::render)
        .unwrap_or_default()
}
