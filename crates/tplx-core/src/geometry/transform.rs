use serde::Serialize;

use crate::geometry::bbox::Rect;

/// 2D affine transform mapping template coordinates to PDF coordinates,
/// stored as the 2x3 matrix `[[a,b,c],[d,e,f]]`.
///
/// Transforms point `(x, y)` to `(a*x + b*y + c, d*x + e*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Diagonal-scale transform, used by the n=0 and n=1 fallback modes.
    pub fn diagonal_scale(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self::new(sx, 0.0, tx, 0.0, sy, ty)
    }

    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.b * y + self.c, self.d * x + self.e * y + self.f)
    }

    /// Transform a template-space box `(x, y, w, h)` and return the PDF-space
    /// axis-aligned bounding box of the transformed corners (§4.2).
    pub fn apply_box(&self, x: f64, y: f64, w: f64, h: f64) -> Rect {
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
        let transformed: Vec<(f64, f64)> =
            corners.iter().map(|&(px, py)| self.apply_point(px, py)).collect();
        Rect::bounding(&transformed).expect("four corners is never empty")
    }

    pub fn as_rows(&self) -> [[f64; 3]; 2] {
        [[self.a, self.b, self.c], [self.d, self.e, self.f]]
    }
}

/// Fit the full affine model (n >= 3 anchors) by linear least squares.
///
/// Stacks a `2n x 6` design matrix with rows `[x,y,1,0,0,0]` /
/// `[0,0,0,x,y,1]` and solves `min||A*theta - b||^2` via the normal
/// equations `(A^T A) theta = A^T b`, solved with Gaussian elimination over
/// the resulting 6x6 symmetric system. Returns `None` if `A^T A` is singular
/// (collinear or duplicate anchor points) so the caller can fall back.
pub fn fit_affine(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Transform> {
    debug_assert_eq!(src.len(), dst.len());
    let n = src.len();
    if n < 3 {
        return None;
    }

    // Accumulate A^T A (6x6) and A^T b (6) directly, without materializing A.
    let mut ata = [[0.0f64; 6]; 6];
    let mut atb = [0.0f64; 6];

    for i in 0..n {
        let (x, y) = src[i];
        let (u, v) = dst[i];
        let row_x = [x, y, 1.0, 0.0, 0.0, 0.0];
        let row_y = [0.0, 0.0, 0.0, x, y, 1.0];
        for (row, rhs) in [(row_x, u), (row_y, v)] {
            for r in 0..6 {
                if row[r] == 0.0 {
                    continue;
                }
                atb[r] += row[r] * rhs;
                for c in 0..6 {
                    ata[r][c] += row[r] * row[c];
                }
            }
        }
    }

    let theta = solve_6x6(ata, atb)?;
    Some(Transform::new(theta[0], theta[1], theta[2], theta[3], theta[4], theta[5]))
}

/// Gaussian elimination with partial pivoting over a 6x6 linear system.
fn solve_6x6(mut m: [[f64; 6]; 6], mut rhs: [f64; 6]) -> Option<[f64; 6]> {
    const N: usize = 6;
    for col in 0..N {
        let pivot = (col..N)
            .max_by(|&r1, &r2| m[r1][col].abs().partial_cmp(&m[r2][col].abs()).unwrap())?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        let pivot_val = m[col][col];
        for c in 0..N {
            m[col][c] /= pivot_val;
        }
        rhs[col] /= pivot_val;

        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..N {
                m[row][c] -= factor * m[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    Some(rhs)
}

/// Fit the similarity model (n=2 anchors): uniform scale + rotation + translation.
pub fn fit_similarity(p1: (f64, f64), p2: (f64, f64), q1: (f64, f64), q2: (f64, f64)) -> Transform {
    let (vx_p, vy_p) = (p2.0 - p1.0, p2.1 - p1.1);
    let (vx_q, vy_q) = (q2.0 - q1.0, q2.1 - q1.1);

    let norm_p = vx_p.hypot(vy_p).max(1e-12);
    let norm_q = vx_q.hypot(vy_q);
    let s = norm_q / norm_p;

    let theta = vy_q.atan2(vx_q) - vy_p.atan2(vx_p);
    let (cos_t, sin_t) = (theta.cos(), theta.sin());

    let a = s * cos_t;
    let b = -s * sin_t;
    let d = s * sin_t;
    let e = s * cos_t;
    let c = q1.0 - (a * p1.0 + b * p1.1);
    let f = q1.1 - (d * p1.0 + e * p1.1);

    Transform::new(a, b, c, d, e, f)
}

/// Fit the scaled-translation model (n=1 anchor), using the meta scale
/// `s = pdfWidthBase/renderWidth`.
pub fn fit_scaled_translation(p1: (f64, f64), q1: (f64, f64), scale: f64) -> Transform {
    let du = q1.0 - scale * p1.0;
    let dv = q1.1 - scale * p1.1;
    Transform::diagonal_scale(scale, scale, du, dv)
}

/// Meta-only fallback (n=0 anchors): diagonal scale from page meta alone.
pub fn fit_meta_only(pdf_width_base: f64, pdf_height_base: f64, render_width: f64, render_height: f64) -> Transform {
    Transform::diagonal_scale(pdf_width_base / render_width, pdf_height_base / render_height, 0.0, 0.0)
}
