//! Pairwise preference margins between two rankings.

use itertools::Itertools;

/// Weight of the user ranking in each pairwise vote.
pub const USER_WEIGHT: f64 = 0.5;

/// Weight of the platform ranking in each pairwise vote.
pub const PLATFORM_WEIGHT: f64 = 0.5;

/// Margin recorded in both directions when the two rankings disagree with
/// equal strength.
pub const TIE_MARGIN: f64 = 0.1;

/// Dense `n × n` margin matrix over candidate indices.
///
/// `weight(i, j) > 0` records a preference for `i` above `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceMargins {
    n: usize,
    weights: Vec<f64>,
}

impl PreferenceMargins {
    /// Build margins from the positions each ranking assigns to candidates
    /// `0..n`. Both slices must have length `n` and hold permutations of `0..n`.
    pub fn from_positions(user: &[usize], platform: &[usize]) -> Self {
        let n = user.len();
        let mut weights = vec![0.0; n * n];

        for (i, j) in (0..n).tuple_combinations() {
            let sign_user = if user[i] < user[j] { 1.0 } else { -1.0 };
            let sign_platform = if platform[i] < platform[j] { 1.0 } else { -1.0 };
            let vote = USER_WEIGHT * sign_user + PLATFORM_WEIGHT * sign_platform;

            if vote > 0.0 {
                weights[i * n + j] = vote.abs();
            } else if vote < 0.0 {
                weights[j * n + i] = vote.abs();
            } else {
                weights[i * n + j] = TIE_MARGIN;
                weights[j * n + i] = TIE_MARGIN;
            }
        }

        Self { n, weights }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.n + j]
    }

    /// Recorded margins `(i, j, weight)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n)
            .cartesian_product(0..self.n)
            .map(|(i, j)| (i, j, self.weight(i, j)))
            .filter(|(_, _, w)| *w > 0.0)
    }

    /// Total weight of recorded preferences that `order` reverses.
    pub fn disagreement(&self, order: &[usize]) -> f64 {
        let mut position = vec![0usize; self.n];
        for (pos, &candidate) in order.iter().enumerate() {
            position[candidate] = pos;
        }
        self.iter()
            .filter(|&(i, j, _)| position[j] < position[i])
            .map(|(_, _, w)| w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanimous_pairs_get_full_margin() {
        let margins = PreferenceMargins::from_positions(&[0, 1, 2], &[0, 1, 2]);
        assert_eq!(margins.weight(0, 1), 1.0);
        assert_eq!(margins.weight(1, 0), 0.0);
        assert_eq!(margins.iter().count(), 3);
        assert_eq!(margins.disagreement(&[0, 1, 2]), 0.0);
        assert_eq!(margins.disagreement(&[2, 1, 0]), 3.0);
    }

    #[test]
    fn test_split_votes_record_tie_margin_both_ways() {
        // user [A, B, C], platform [B, C, A]
        let margins = PreferenceMargins::from_positions(&[0, 1, 2], &[2, 0, 1]);
        assert_eq!(margins.weight(0, 1), TIE_MARGIN);
        assert_eq!(margins.weight(1, 0), TIE_MARGIN);
        assert_eq!(margins.weight(0, 2), TIE_MARGIN);
        assert_eq!(margins.weight(2, 0), TIE_MARGIN);
        assert_eq!(margins.weight(1, 2), 1.0);
        assert_eq!(margins.weight(2, 1), 0.0);
    }
}
