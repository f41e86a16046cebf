use serde::{Deserialize, Serialize};

/// Kinds of changes detected during presentation comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PmlChangeType {
    SlideSizeChanged,

    SlideInserted,
    SlideDeleted,
    SlideMoved,
    SlideLayoutChanged,
    SlideBackgroundChanged,
    SlideTransitionChanged,
    SlideNotesChanged,

    ShapeInserted,
    ShapeDeleted,
    ShapeMoved,
    ShapeResized,
    ShapeRotated,
    ShapeZOrderChanged,

    TextChanged,
    TextFormattingChanged,
    ImageReplaced,
    TableContentChanged,
    ChartDataChanged,
    ShapeStyleChanged,
}

/// One detected change; `slide_index` is 1-based in the newer deck,
/// `old_slide_index` in the older one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmlChange {
    pub change_type: Option<PmlChangeType>,
    pub slide_index: Option<usize>,
    pub old_slide_index: Option<usize>,
    pub shape_name: Option<String>,
    pub shape_id: Option<u32>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,

    // Transform deltas in EMU.
    pub old_x: Option<i64>,
    pub old_y: Option<i64>,
    pub old_cx: Option<i64>,
    pub old_cy: Option<i64>,
    pub new_x: Option<i64>,
    pub new_y: Option<i64>,
    pub new_cx: Option<i64>,
    pub new_cy: Option<i64>,

    pub match_confidence: Option<f64>,
}

impl PmlChange {
    pub fn of(change_type: PmlChangeType) -> Self {
        Self {
            change_type: Some(change_type),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> PmlChangeType {
        self.change_type.unwrap_or(PmlChangeType::SlideInserted)
    }

    pub fn describe(&self) -> String {
        let slide = self.slide_index.unwrap_or(0);
        let shape = self.shape_name.as_deref().unwrap_or("");
        match self.kind() {
            PmlChangeType::SlideSizeChanged => format!(
                "Slide size changed from {} to {}",
                self.old_value.as_deref().unwrap_or(""),
                self.new_value.as_deref().unwrap_or("")
            ),
            PmlChangeType::SlideInserted => format!("Slide {slide} inserted"),
            PmlChangeType::SlideDeleted => {
                format!("Slide {} deleted", self.old_slide_index.unwrap_or(0))
            }
            PmlChangeType::SlideMoved => format!(
                "Slide moved from position {} to {slide}",
                self.old_slide_index.unwrap_or(0)
            ),
            PmlChangeType::SlideLayoutChanged => format!("Slide {slide} layout changed"),
            PmlChangeType::SlideBackgroundChanged => {
                format!("Slide {slide} background changed")
            }
            PmlChangeType::SlideTransitionChanged => {
                format!("Slide {slide} transition changed")
            }
            PmlChangeType::SlideNotesChanged => format!("Slide {slide} notes changed"),
            PmlChangeType::ShapeInserted => {
                format!("Shape '{shape}' inserted on slide {slide}")
            }
            PmlChangeType::ShapeDeleted => {
                format!("Shape '{shape}' deleted from slide {slide}")
            }
            PmlChangeType::ShapeMoved => format!("Shape '{shape}' moved on slide {slide}"),
            PmlChangeType::ShapeResized => format!("Shape '{shape}' resized on slide {slide}"),
            PmlChangeType::ShapeRotated => format!("Shape '{shape}' rotated on slide {slide}"),
            PmlChangeType::ShapeZOrderChanged => {
                format!("Shape '{shape}' z-order changed on slide {slide}")
            }
            PmlChangeType::TextChanged => {
                format!("Text changed in '{shape}' on slide {slide}")
            }
            PmlChangeType::TextFormattingChanged => {
                format!("Text formatting changed in '{shape}' on slide {slide}")
            }
            PmlChangeType::ImageReplaced => {
                format!("Image replaced in '{shape}' on slide {slide}")
            }
            PmlChangeType::TableContentChanged => {
                format!("Table content changed in '{shape}' on slide {slide}")
            }
            PmlChangeType::ChartDataChanged => {
                format!("Chart data changed in '{shape}' on slide {slide}")
            }
            PmlChangeType::ShapeStyleChanged => {
                format!("Shape style changed in '{shape}' on slide {slide}")
            }
        }
    }
}

/// Outcome of one presentation comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmlComparisonResult {
    pub changes: Vec<PmlChange>,
    pub warnings: Vec<String>,
}

impl PmlComparisonResult {
    pub fn total_changes(&self) -> usize {
        self.changes.len()
    }

    fn count(&self, kind: PmlChangeType) -> usize {
        self.changes.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn slides_inserted(&self) -> usize {
        self.count(PmlChangeType::SlideInserted)
    }

    pub fn slides_deleted(&self) -> usize {
        self.count(PmlChangeType::SlideDeleted)
    }

    pub fn is_identical(&self) -> bool {
        self.changes.is_empty()
    }
}
