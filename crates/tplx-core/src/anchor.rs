use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::block::Block;
use crate::geometry::Rect;
use crate::template::schema::{Anchor, AnchorKind};

const SEARCH_BOX_TOLERANCE: f64 = 0.5;

/// Outcome of matching one anchor on one page (§4.3).
#[derive(Debug, Clone)]
pub struct AnchorMatch {
    /// Template-space expected point, scaled to PDF space.
    pub expected: (f64, f64),
    /// PDF-space top-left of the winning block, used as the correspondence `Q`.
    pub found: (f64, f64),
}

/// Debug-friendly summary of one anchor's match attempt, per §6's
/// `debug.anchors[page].found` shape.
#[derive(Debug, Clone, Serialize)]
pub struct AnchorDebug {
    pub id: String,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<(f64, f64)>,
}

/// Compile an anchor's pattern per §4.3: `text` anchors are regex-escaped,
/// `regex` anchors are used verbatim; flags always include multiline +
/// dotall, plus case-insensitivity unless `caseSensitive` is set.
///
/// A malformed pattern is not a validation error (§4.8 only checks shape,
/// not regex syntax) — it is logged and treated by the caller as a miss.
pub fn compile_anchor_pattern(anchor: &Anchor) -> Option<Regex> {
    let pattern = match anchor.kind {
        AnchorKind::Text => regex::escape(&anchor.pattern),
        AnchorKind::Regex => anchor.pattern.clone(),
    };

    RegexBuilder::new(&pattern)
        .multi_line(true)
        .dot_matches_new_line(true)
        .case_insensitive(!anchor.case_sensitive)
        .build()
        .map_err(|e| log::warn!("anchor '{}' pattern failed to compile: {e}", anchor.id))
        .ok()
}

/// Find an anchor within one page's blocks. Returns `None` on a miss (no
/// intersecting block matches the pattern) — non-fatal per §4.3.
pub fn match_anchor(anchor: &Anchor, page_blocks: &[Block], scale: f64) -> Option<AnchorMatch> {
    let sb = anchor.effective_search_box();
    let search_rect = Rect::new(sb.x * scale, sb.y * scale, (sb.x + sb.w) * scale, (sb.y + sb.h) * scale);

    let pattern = compile_anchor_pattern(anchor)?;

    let candidates: Vec<&Block> = page_blocks
        .iter()
        .filter(|b| search_rect.intersects_tol(&b.rect(), SEARCH_BOX_TOLERANCE))
        .filter(|b| pattern.is_match(&b.text))
        .collect();

    let expected = (anchor.x * scale, anchor.y * scale);

    let best = candidates.into_iter().min_by(|a, b| {
        distance_sq(a, expected)
            .partial_cmp(&distance_sq(b, expected))
            .unwrap()
    })?;

    Some(AnchorMatch {
        expected,
        found: (best.x0(), best.y0()),
    })
}

fn distance_sq(block: &Block, expected: (f64, f64)) -> f64 {
    let dx = block.x0() - expected.0;
    let dy = block.y0() - expected.1;
    dx * dx + dy * dy
}
