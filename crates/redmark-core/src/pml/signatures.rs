//! Canonical signatures for presentation comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape classification derived from the element tag and, for graphic
/// frames, the `graphicData/@uri`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ShapeKind {
    TextBox,
    AutoShape,
    Picture,
    Table,
    Chart,
    SmartArt,
    OleObject,
    Group,
    Connector,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShapeKind::TextBox => "TextBox",
            ShapeKind::AutoShape => "AutoShape",
            ShapeKind::Picture => "Picture",
            ShapeKind::Table => "Table",
            ShapeKind::Chart => "Chart",
            ShapeKind::SmartArt => "SmartArt",
            ShapeKind::OleObject => "OleObject",
            ShapeKind::Group => "Group",
            ShapeKind::Connector => "Connector",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub ph_type: String,
    pub index: Option<u32>,
}

/// Position and size in EMU plus rotation (1/60000 degree) and flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub rotation: i32,
    pub flip_h: bool,
    pub flip_v: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunProperties {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub font_name: Option<String>,
    /// Hundredths of a point, as serialized.
    pub font_size: Option<i32>,
    pub font_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSignature {
    pub text: String,
    pub properties: Option<RunProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphSignature {
    pub runs: Vec<RunSignature>,
    pub plain_text: String,
    pub alignment: Option<String>,
    pub has_bullet: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBodySignature {
    pub paragraphs: Vec<ParagraphSignature>,
    pub plain_text: String,
}

impl TextBodySignature {
    /// Paragraph/run property sets without the text itself; equal plain
    /// text with different property sets is a formatting-only change.
    pub fn formatting_fingerprint(&self) -> Vec<(Option<String>, bool, Vec<Option<RunProperties>>)> {
        self.paragraphs
            .iter()
            .map(|p| {
                (
                    p.alignment.clone(),
                    p.has_bullet,
                    p.runs.iter().map(|r| r.properties.clone()).collect(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeSignature {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
    pub placeholder: Option<Placeholder>,
    pub z_order: usize,
    pub transform: Option<Transform>,
    pub geometry_hash: Option<String>,
    pub text_body: Option<TextBodySignature>,
    pub image_hash: Option<String>,
    pub table_hash: Option<String>,
    pub chart_hash: Option<String>,
    pub style_hash: Option<String>,
    /// Populated for groups only.
    pub children: Option<Vec<ShapeSignature>>,
    pub content_hash: String,
}

impl ShapeSignature {
    pub fn plain_text(&self) -> &str {
        self.text_body
            .as_ref()
            .map(|tb| tb.plain_text.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSignature {
    /// 1-based position in the slide list.
    pub index: usize,
    pub part_uri: String,
    pub layout_hash: Option<String>,
    pub background_hash: Option<String>,
    pub transition_hash: Option<String>,
    pub title_text: Option<String>,
    pub notes_text: Option<String>,
    /// Hash over title plus per-shape name:kind:text; doubles as the
    /// rename/move fingerprint.
    pub content_hash: String,
    pub shapes: Vec<ShapeSignature>,
}

impl SlideSignature {
    pub fn shape_names(&self) -> Vec<String> {
        self.shapes.iter().map(|s| s.name.clone()).collect()
    }

    pub fn shape_kinds(&self) -> Vec<String> {
        self.shapes.iter().map(|s| s.kind.to_string()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresentationSignature {
    pub slide_cx: i64,
    pub slide_cy: i64,
    pub slides: Vec<SlideSignature>,
}
