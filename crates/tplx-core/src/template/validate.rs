use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::template::schema::{AnchorKind, ResolvedPageMeta, Template};

/// Validate a template's shape per §4.8/§3 and return its normalized,
/// integer-keyed page metadata for use by the applier. Structural violations
/// raise `Error::Validation` with a path pinpointing the offending field;
/// everything else (anchor misses, dangling regexes, cast failures) is a
/// normal runtime outcome handled elsewhere, never here.
pub fn validate(template: &Template) -> Result<BTreeMap<u32, ResolvedPageMeta>> {
    if template.id.is_empty() {
        return Err(Error::validation("id", "template id must not be empty"));
    }

    if template.meta.pages.is_empty() {
        return Err(Error::validation("meta.pages", "meta.pages must be a non-empty mapping"));
    }

    let mut pages = BTreeMap::new();
    for (raw_key, page_meta) in &template.meta.pages {
        let page_num: u32 = raw_key
            .parse()
            .map_err(|_| Error::validation("meta.pages", format!("page key '{raw_key}' is not an integer")))?;

        let path = format!("meta.pages[{page_num}]");
        let pdf_width_base = require_field(&path, "pdfWidthBase", page_meta.pdf_width_base)?;
        let pdf_height_base = require_field(&path, "pdfHeightBase", page_meta.pdf_height_base)?;
        let render_width = require_field(&path, "renderWidth", page_meta.render_width)?;
        let render_height = require_field(&path, "renderHeight", page_meta.render_height)?;
        let viewport_scale = require_field(&path, "viewportScale", page_meta.viewport_scale)?;

        for (i, anchor) in page_meta.anchors.iter().enumerate() {
            let anchor_path = format!("{path}.anchors[{i}]");
            if anchor.id.is_empty() {
                return Err(Error::validation(format!("{anchor_path}.id"), "anchor id is required"));
            }
            if anchor.pattern.is_empty() {
                return Err(Error::validation(format!("{anchor_path}.pattern"), "anchor pattern is required"));
            }
            if !matches!(anchor.kind, AnchorKind::Text | AnchorKind::Regex) {
                return Err(Error::validation(format!("{anchor_path}.kind"), "kind must be text or regex"));
            }
            if let Some(sb) = anchor.search_box {
                if sb.w <= 0.0 || sb.h <= 0.0 {
                    return Err(Error::validation(
                        format!("{anchor_path}.searchBox"),
                        "searchBox w and h must be > 0",
                    ));
                }
            }
        }

        pages.insert(
            page_num,
            ResolvedPageMeta {
                pdf_width_base,
                pdf_height_base,
                render_width,
                render_height,
                viewport_scale,
                rotation: page_meta.rotation,
                anchors: page_meta.anchors.clone(),
            },
        );
    }

    let mut boxes_with_content: BTreeSet<u32> = BTreeSet::new();
    let mut box_ids: BTreeSet<&str> = BTreeSet::new();
    for b in &template.boxes {
        box_ids.insert(b.id.as_str());
        boxes_with_content.insert(b.page as u32);
        if b.page == 0 {
            return Err(Error::validation(format!("boxes[{}].page", b.id), "page must be >= 1"));
        }
        if b.w <= 0.0 || b.h <= 0.0 {
            return Err(Error::validation(format!("boxes[{}]", b.id), "w and h must be > 0"));
        }
    }

    for page_num in &boxes_with_content {
        let anchor_count = pages.get(page_num).map(|pm| pm.anchors.len()).unwrap_or(0);
        if anchor_count < 3 {
            return Err(Error::validation(
                format!("meta.pages[{page_num}].anchors"),
                format!("page {page_num} has boxes and must declare at least 3 anchors, found {anchor_count}"),
            ));
        }
    }

    for (i, field) in template.fields.iter().enumerate() {
        if !box_ids.contains(field.box_id.as_str()) {
            return Err(Error::validation(
                format!("fields[{i}].boxId"),
                format!("boxId '{}' does not reference any declared box", field.box_id),
            ));
        }
    }

    Ok(pages)
}

fn require_field(path: &str, field: &str, value: Option<f64>) -> Result<f64> {
    value.ok_or_else(|| Error::validation(format!("{path}.{field}"), format!("{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::schema::{Anchor, Box, Field, Meta, PageMeta};

    fn page_meta_with(anchors: Vec<Anchor>) -> PageMeta {
        PageMeta {
            pdf_width_base: Some(600.0),
            pdf_height_base: Some(800.0),
            render_width: Some(600.0),
            render_height: Some(800.0),
            viewport_scale: Some(1.0),
            rotation: 0.0,
            anchors,
        }
    }

    fn anchor(id: &str) -> Anchor {
        Anchor {
            id: id.into(),
            name: None,
            x: 10.0,
            y: 10.0,
            kind: AnchorKind::Regex,
            pattern: "FACTURA".into(),
            case_sensitive: false,
            search_box: None,
        }
    }

    fn base_template() -> Template {
        let mut meta = Meta::default();
        meta.pages.insert(
            "1".into(),
            page_meta_with(vec![anchor("a1"), anchor("a2"), anchor("a3")]),
        );
        Template {
            id: "tpl-1".into(),
            name: "Invoice".into(),
            boxes: vec![Box { id: "b1".into(), page: 1, x: 100.0, y: 100.0, w: 80.0, h: 20.0, name: None }],
            fields: vec![Field {
                field_id: None,
                key: "num".into(),
                box_id: "b1".into(),
                required: false,
                normalizers: vec![],
                regex: Some(r"(\d+)".into()),
                cast: None,
            }],
            meta,
        }
    }

    #[test]
    fn valid_template_passes() {
        let tpl = base_template();
        let pages = validate(&tpl).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[&1].pdf_width_base, 600.0);
    }

    #[test]
    fn empty_id_rejected() {
        let mut tpl = base_template();
        tpl.id = String::new();
        assert!(validate(&tpl).is_err());
    }

    #[test]
    fn page_with_box_needs_three_anchors() {
        let mut tpl = base_template();
        tpl.meta.pages.get_mut("1").unwrap().anchors.truncate(1);
        let err = validate(&tpl).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn missing_page_meta_field_reports_path() {
        let mut tpl = base_template();
        tpl.meta.pages.get_mut("1").unwrap().pdf_width_base = None;
        let err = validate(&tpl).unwrap_err();
        match err {
            Error::Validation { path, .. } => assert_eq!(path, "meta.pages[1].pdfWidthBase"),
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn dangling_box_id_rejected() {
        let mut tpl = base_template();
        tpl.fields[0].box_id = "does-not-exist".into();
        let err = validate(&tpl).unwrap_err();
        match err {
            Error::Validation { path, .. } => assert_eq!(path, "fields[0].boxId"),
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn non_integer_page_key_rejected() {
        let mut tpl = base_template();
        let pm = tpl.meta.pages.remove("1").unwrap();
        tpl.meta.pages.insert("first".into(), pm);
        assert!(validate(&tpl).is_err());
    }

    #[test]
    fn box_page_zero_rejected() {
        let mut tpl = base_template();
        tpl.boxes[0].page = 0;
        let err = validate(&tpl).unwrap_err();
        match err {
            Error::Validation { path, .. } => assert_eq!(path, "boxes[b1].page"),
            _ => panic!("expected validation error"),
        }
    }
}
