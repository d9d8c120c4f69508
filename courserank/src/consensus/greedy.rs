//! Greedy net-margin ordering for candidate sets too large to solve exactly.

use super::margins::PreferenceMargins;

/// Repeatedly emit the remaining candidate with the largest net margin
/// (outgoing minus incoming) over the remaining set. Ties go to the lower
/// index, i.e. the candidate the user ranking places first.
pub fn greedy_order(margins: &PreferenceMargins) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..margins.len()).collect();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_net = f64::NEG_INFINITY;
        for (slot, &c) in remaining.iter().enumerate() {
            let net: f64 = remaining
                .iter()
                .filter(|&&d| d != c)
                .map(|&d| margins.weight(c, d) - margins.weight(d, c))
                .sum();
            if net > best_net {
                best = slot;
                best_net = net;
            }
        }
        order.push(remaining.remove(best));
    }

    order
}
