use crate::block::Block;
use crate::geometry::{group_rows, Rect, Transform};

const BOX_INTERSECTION_TOLERANCE: f64 = 0.75;
const ROW_TOLERANCE: f64 = 14.0;

/// Reproject a template-space box through `transform` and assemble its text
/// from the page's blocks (§4.4): select blocks intersecting the
/// reprojected rect, cluster into reading-order rows, join within a row
/// with a space and between rows with a newline.
pub fn assemble_box_text(rect: &Rect, page_blocks: &[Block]) -> String {
    let inside: Vec<&Block> = page_blocks
        .iter()
        .filter(|b| rect.intersects_tol(&b.rect(), BOX_INTERSECTION_TOLERANCE))
        .collect();

    if inside.is_empty() {
        return String::new();
    }

    let rows = group_rows(&inside, ROW_TOLERANCE, |b| b.y0(), |b| b.x0());

    rows.iter()
        .map(|row| row.iter().map(|&i| inside[i].text.as_str()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Reproject a template-space box through `transform` into PDF space (§4.2).
pub fn reproject_box(transform: &Transform, x: f64, y: f64, w: f64, h: f64) -> Rect {
    transform.apply_box(x, y, w, h)
}
