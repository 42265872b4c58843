use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// One text token/line emitted by the (out-of-scope) PDF/OCR layer, with a
/// bounding rectangle in PDF points, origin top-left. Callers whose producer
/// emits bottom-left origin must flip `(y0,y1) <- (ph-y1, ph-y0)` before
/// handing blocks to this crate (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub page: usize,
    pub coordinates: [f64; 4],
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<BlockSource>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<BlockKind>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conf: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSource {
    Native,
    Ocr,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Line,
    Word,
    Block,
}

impl Block {
    pub fn x0(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn y0(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn x1(&self) -> f64 {
        self.coordinates[2]
    }

    pub fn y1(&self) -> f64 {
        self.coordinates[3]
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x0(), self.y0(), self.x1(), self.y1())
    }
}
