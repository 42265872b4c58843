/// Row-aware reading-order clustering (§4.1).
///
/// Sorts items ascending by `y0`, then walks the list collecting a "current
/// row" while `|y0 - row_base| <= row_tol`; once the gap exceeds `row_tol` the
/// row closes and a new one opens, seeded by the current item's `y0`. Each
/// row is then sorted ascending by `x0`, and rows are sorted by their first
/// item's `y0`. Returns rows as groups of indices into `items`, each row
/// already left-to-right, rows themselves top-to-bottom.
///
/// This is a one-pass walk, not a symmetric tolerance clustering: a chain of
/// items each within `row_tol` of the previous (but not of the first) still
/// ends up in one row, matching the reference implementation's behavior.
pub fn group_rows<T>(items: &[T], row_tol: f64, y0: impl Fn(&T) -> f64, x0: impl Fn(&T) -> f64) -> Vec<Vec<usize>> {
    if items.is_empty() {
        return vec![];
    }

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| y0(&items[a]).partial_cmp(&y0(&items[b])).unwrap());

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = vec![order[0]];
    let mut row_base = y0(&items[order[0]]);

    for &idx in &order[1..] {
        let y = y0(&items[idx]);
        if (y - row_base).abs() <= row_tol {
            current.push(idx);
        } else {
            rows.push(current);
            current = vec![idx];
            row_base = y;
        }
    }
    rows.push(current);

    for row in &mut rows {
        row.sort_by(|&a, &b| x0(&items[a]).partial_cmp(&x0(&items[b])).unwrap());
    }
    rows.sort_by(|a, b| y0(&items[a[0]]).partial_cmp(&y0(&items[b[0]])).unwrap());

    rows
}
