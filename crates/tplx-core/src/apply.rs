use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::anchor::{match_anchor, AnchorDebug};
use crate::assemble::{assemble_box_text, reproject_box};
use crate::block::Block;
use crate::error::{Error, Result};
use crate::field::{evaluate_field, FieldDebug};
use crate::geometry::Transform;
use crate::template::schema::{ResolvedPageMeta, Template};
use crate::template::validate;

const BOX_TEXT_PREVIEW: usize = 300;

/// Outcome of one `apply` call (§4.6, §6).
///
/// `values` is a `serde_json::Map`, not a `BTreeMap`, because §4.5 requires
/// the result to preserve field declaration order on serialization; a
/// `BTreeMap` would alphabetize keys instead.
#[derive(Debug, Serialize)]
pub struct ApplyResult {
    pub values: serde_json::Map<String, Value>,
    pub missing_required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

#[derive(Debug, Serialize)]
pub struct DebugInfo {
    pub anchors: BTreeMap<u32, PageAnchorDebug>,
    pub transforms: BTreeMap<u32, [[f64; 3]; 2]>,
    pub boxes: BTreeMap<String, BoxDebug>,
    pub fields: BTreeMap<String, FieldDebug>,
}

#[derive(Debug, Serialize)]
pub struct PageAnchorDebug {
    pub found: Vec<AnchorDebug>,
    #[serde(rename = "T")]
    pub t: [[f64; 3]; 2],
}

#[derive(Debug, Serialize)]
pub struct BoxDebug {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_name: Option<String>,
    pub page: usize,
    pub rect_pdf: [f64; 4],
    pub text_preview: String,
}

/// Apply `template` to `blocks` per §4.6's orchestration: validate, group
/// blocks by page, fit one transform per page, reproject boxes, assemble
/// text, evaluate fields.
pub fn apply(template: &Template, blocks: &[Block], include_debug: bool) -> Result<ApplyResult> {
    let pages = validate(template)?;

    let mut blocks_by_page: HashMap<usize, Vec<&Block>> = HashMap::new();
    for b in blocks {
        blocks_by_page.entry(b.page).or_default().push(b);
    }

    let mut transforms: BTreeMap<u32, Transform> = BTreeMap::new();
    let mut anchor_debug: BTreeMap<u32, PageAnchorDebug> = BTreeMap::new();

    let mut page_numbers: Vec<u32> = pages.keys().copied().collect();
    for &page in blocks_by_page.keys() {
        let page_num = page as u32;
        if !page_numbers.contains(&page_num) {
            page_numbers.push(page_num);
        }
    }
    page_numbers.sort_unstable();

    for page_num in page_numbers {
        let empty: Vec<&Block> = Vec::new();
        let page_blocks = blocks_by_page.get(&(page_num as usize)).unwrap_or(&empty);

        let Some(page_meta) = pages.get(&page_num) else {
            continue;
        };

        let (transform, found) = fit_page_transform(page_meta, page_blocks);

        if include_debug {
            anchor_debug.insert(
                page_num,
                PageAnchorDebug {
                    found,
                    t: transform.as_rows(),
                },
            );
        }
        transforms.insert(page_num, transform);
    }

    let mut box_text: HashMap<&str, String> = HashMap::new();
    let mut box_debug: BTreeMap<String, BoxDebug> = BTreeMap::new();

    for b in &template.boxes {
        let page_num = b.page as u32;
        let empty: Vec<&Block> = Vec::new();
        let page_blocks = blocks_by_page.get(&b.page).unwrap_or(&empty);
        let owned_blocks: Vec<Block> = page_blocks.iter().map(|blk| (*blk).clone()).collect();

        let text = match transforms.get(&page_num) {
            Some(t) => {
                let rect = reproject_box(t, b.x, b.y, b.w, b.h);
                let text = assemble_box_text(&rect, &owned_blocks);
                if include_debug {
                    box_debug.insert(
                        b.id.clone(),
                        BoxDebug {
                            box_name: b.name.clone(),
                            page: b.page,
                            rect_pdf: rect.as_array(),
                            text_preview: preview(&text, BOX_TEXT_PREVIEW),
                        },
                    );
                }
                text
            }
            None => String::new(),
        };

        box_text.insert(b.id.as_str(), text);
    }

    let mut values = serde_json::Map::new();
    let mut missing_required = Vec::new();
    let mut field_debug = BTreeMap::new();

    for field in &template.fields {
        let raw = box_text.get(field.box_id.as_str()).map(String::as_str).unwrap_or("");
        let (result, debug) = evaluate_field(field, raw);

        values.insert(field.key.clone(), result.value);
        if result.missing {
            missing_required.push(field.key.clone());
        }
        if include_debug {
            field_debug.insert(field.key.clone(), debug);
        }
    }

    let debug = include_debug.then(|| DebugInfo {
        anchors: anchor_debug,
        transforms: transforms.iter().map(|(&p, t)| (p, t.as_rows())).collect(),
        boxes: box_debug,
        fields: field_debug,
    });

    Ok(ApplyResult {
        values,
        missing_required,
        debug,
    })
}

/// Match all anchors declared for a page, then select a transform fitting
/// mode by how many correspondences were actually found (§4.2).
fn fit_page_transform(page_meta: &ResolvedPageMeta, page_blocks: &[&Block]) -> (Transform, Vec<AnchorDebug>) {
    let scale = page_meta.scale();
    let owned: Vec<Block> = page_blocks.iter().map(|b| (*b).clone()).collect();

    let mut src = Vec::new();
    let mut dst = Vec::new();
    let mut debug = Vec::new();

    for anchor in &page_meta.anchors {
        match match_anchor(anchor, &owned, scale) {
            Some(m) => {
                src.push((anchor.x, anchor.y));
                dst.push(m.found);
                debug.push(AnchorDebug {
                    id: anchor.id.clone(),
                    matched: true,
                    expected: Some(m.expected),
                    found: Some(m.found),
                });
            }
            None => {
                debug.push(AnchorDebug {
                    id: anchor.id.clone(),
                    matched: false,
                    expected: None,
                    found: None,
                });
            }
        }
    }

    let transform = match src.len() {
        n if n >= 3 => crate::geometry::transform::fit_affine(&src, &dst).unwrap_or_else(|| {
            log::warn!("affine fit singular for page, falling back to meta-only scale");
            fallback(page_meta)
        }),
        2 => crate::geometry::transform::fit_similarity(src[0], src[1], dst[0], dst[1]),
        1 => crate::geometry::transform::fit_scaled_translation(src[0], dst[0], scale),
        _ => fallback(page_meta),
    };

    (transform, debug)
}

fn fallback(page_meta: &ResolvedPageMeta) -> Transform {
    crate::geometry::transform::fit_meta_only(
        page_meta.pdf_width_base,
        page_meta.pdf_height_base,
        page_meta.render_width,
        page_meta.render_height,
    )
}

fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// External template storage boundary (§6). The core only ever calls `get`;
/// the other methods exist so a host crate implements one trait for the
/// whole persistence surface instead of several narrower ones.
pub trait TemplateRepository {
    fn get(&self, id: &str) -> Option<Template>;
    fn list_all(&self) -> Vec<Template>;
    fn upsert(&mut self, template: Template);
    fn delete(&mut self, id: &str);
}

/// Thin wrapper tying a [`TemplateRepository`] to [`apply`], surfacing
/// `Error::NotFound` for unknown template ids (§7.2).
pub struct TemplateEngine<R: TemplateRepository> {
    repository: R,
}

impl<R: TemplateRepository> TemplateEngine<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn apply_template(&self, id: &str, blocks: &[Block], include_debug: bool) -> Result<ApplyResult> {
        let template = self
            .repository
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        apply(&template, blocks, include_debug)
    }
}
