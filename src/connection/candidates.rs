//! Port scan ordering.

/// Indices to try, in order: `saved` first when it is in bounds, then every
/// other index ascending.
///
/// ```
/// use slipline::connection::candidate_order;
///
/// assert_eq!(candidate_order(Some(2), 3), vec![2, 0, 1]);
/// assert_eq!(candidate_order(Some(7), 3), vec![0, 1, 2]);
/// ```
pub fn candidate_order(saved: Option<usize>, len: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    if let Some(index) = saved.filter(|&i| i < len) {
        order.push(index);
    }
    order.extend((0..len).filter(|&i| Some(i) != saved));
    order
}
