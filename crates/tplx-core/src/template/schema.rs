use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user-authored template: boxes + field rules tied to a reference page
/// layout, registered against a real document via anchors (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub boxes: Vec<Box>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub meta: Meta,
}

/// `meta.pages` maps page number -> PageMeta. JSON object keys are always
/// strings; §4.8 normalizes them to integers during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pages: BTreeMap<String, PageMeta>,
}

/// Raw page metadata as received on the wire. The five numeric fields are
/// `Option` here so §4.8 validation can report a precise missing-field path
/// rather than failing at deserialization with no offending-path context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub pdf_width_base: Option<f64>,
    pub pdf_height_base: Option<f64>,
    pub render_width: Option<f64>,
    pub render_height: Option<f64>,
    pub viewport_scale: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
}

/// `PageMeta` after §4.8 validation: all five numeric fields confirmed
/// present, used directly by the transform kernel and applier.
#[derive(Debug, Clone)]
pub struct ResolvedPageMeta {
    pub pdf_width_base: f64,
    pub pdf_height_base: f64,
    pub render_width: f64,
    pub render_height: f64,
    pub viewport_scale: f64,
    pub rotation: f64,
    pub anchors: Vec<Anchor>,
}

impl ResolvedPageMeta {
    /// `s = pdfWidthBase / renderWidth`.
    pub fn scale(&self) -> f64 {
        self.pdf_width_base / self.render_width
    }
}

/// A rectangle in template/render coordinates identifying a region of
/// interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Box {
    pub id: String,
    #[serde(default = "default_page")]
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_page() -> usize {
    1
}

/// An extraction rule producing one key/value from a box's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Internal identifier, carried through for round-tripping; never read
    /// by the engine (§3A).
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "id")]
    pub field_id: Option<String>,
    pub key: String,
    pub box_id: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub normalizers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Cast>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cast {
    Int,
    Float,
    Decimal,
}

/// A named regex/text probe with an expected location, used to register a
/// template against a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: AnchorKind,
    pub pattern: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_box: Option<SearchBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Text,
    Regex,
}

impl Default for AnchorKind {
    fn default() -> Self {
        AnchorKind::Regex
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Anchor {
    /// Resolve the effective search box, applying the `{x-50,y-20,100,40}`
    /// default (§3).
    pub fn effective_search_box(&self) -> SearchBox {
        self.search_box.unwrap_or(SearchBox {
            x: self.x - 50.0,
            y: self.y - 20.0,
            w: 100.0,
            h: 40.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_box_defaults() {
        let a = Anchor {
            id: "a1".into(),
            name: None,
            x: 100.0,
            y: 50.0,
            kind: AnchorKind::Regex,
            pattern: "FACTURA".into(),
            case_sensitive: false,
            search_box: None,
        };
        let sb = a.effective_search_box();
        assert_eq!(sb.x, 50.0);
        assert_eq!(sb.y, 30.0);
        assert_eq!(sb.w, 100.0);
        assert_eq!(sb.h, 40.0);
    }

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = serde_json::json!({
            "id": "b1", "page": 1, "x": 100.0, "y": 100.0, "w": 80.0, "h": 20.0
        });
        let b: Box = serde_json::from_value(json).unwrap();
        assert_eq!(b.id, "b1");
        assert_eq!(b.page, 1);
    }
}
