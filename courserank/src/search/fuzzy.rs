//! Fuzzy string scoring on the 0..=100 scale.
//!
//! [`IndelFuzzyScorer`] scores strings by their indel (insert/delete) edit
//! distance, normalised so that identical strings score 100:
//!
//! ```text
//! ratio(a, b) = 100 * 2 * LCS(a, b) / (|a| + |b|)
//! ```
//!
//! `partial_ratio` slides the shorter string over the longer one and keeps the
//! best window (windows hanging over either edge included), `token_set_ratio`
//! compares the shared and the leftover tokens of both strings.

use std::collections::{BTreeSet, HashMap};

/// Fuzzy matching primitives used by the lexical stage.
pub trait FuzzyScorer: Send + Sync {
    /// Best alignment of the shorter string inside the longer one.
    fn partial_ratio(&self, a: &str, b: &str) -> f64;

    /// Order- and duplication-insensitive token comparison.
    fn token_set_ratio(&self, a: &str, b: &str) -> f64;
}

/// Indel-distance based scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelFuzzyScorer;

impl IndelFuzzyScorer {
    pub fn new() -> Self {
        Self
    }

    /// Plain normalised indel similarity of two strings.
    pub fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        ratio_chars(&a, &b)
    }
}

impl FuzzyScorer for IndelFuzzyScorer {
    fn partial_ratio(&self, a: &str, b: &str) -> f64 {
        let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        if short.is_empty() {
            return 0.0;
        }
        if contains(&long, &short) {
            return 100.0;
        }

        let m = short.len();
        let n = long.len();
        let lcs = Lcs::new(&short);
        let mut best = 0.0f64;

        let mut consider = |window: &[char]| {
            let score = ratio_from_lcs(lcs.len(window), m, window.len());
            if score > best {
                best = score;
            }
        };

        // Windows hanging over the left edge
        for end in 1..m {
            consider(&long[..end]);
        }
        // Full-width windows
        for start in 0..=(n - m) {
            consider(&long[start..start + m]);
        }
        // Windows hanging over the right edge
        for start in (n - m + 1)..n {
            consider(&long[start..]);
        }

        best
    }

    fn token_set_ratio(&self, a: &str, b: &str) -> f64 {
        let tokens_a = tokenize(a);
        let tokens_b = tokenize(b);
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0.0;
        }

        let shared: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
        let only_a: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
        let only_b: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

        let sorted_shared = shared.join(" ");
        let combined_a = join_nonempty(&sorted_shared, &only_a.join(" "));
        let combined_b = join_nonempty(&sorted_shared, &only_b.join(" "));

        [
            self.ratio(&sorted_shared, &combined_a),
            self.ratio(&sorted_shared, &combined_b),
            self.ratio(&combined_a, &combined_b),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

/// Lowercased alphanumeric tokens, deduplicated and sorted.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let lcs = if a.len() <= b.len() {
        Lcs::new(a).len(b)
    } else {
        Lcs::new(b).len(a)
    };
    ratio_from_lcs(lcs, a.len(), b.len())
}

fn ratio_from_lcs(lcs: usize, len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 0.0;
    }
    200.0 * lcs as f64 / total as f64
}

/// Longest-common-subsequence length against a fixed pattern.
///
/// Patterns of up to 64 characters use the bit-parallel recurrence
/// `V' = (V + (V & M)) | (V & !M)`; longer ones fall back to the
/// two-row dynamic program.
enum Lcs<'a> {
    BitParallel {
        masks: HashMap<char, u64>,
        len: usize,
    },
    Table(&'a [char]),
}

impl<'a> Lcs<'a> {
    fn new(pattern: &'a [char]) -> Self {
        if pattern.len() > 64 {
            return Lcs::Table(pattern);
        }

        let mut masks: HashMap<char, u64> = HashMap::new();
        for (i, c) in pattern.iter().enumerate() {
            *masks.entry(*c).or_default() |= 1u64 << i;
        }
        Lcs::BitParallel {
            masks,
            len: pattern.len(),
        }
    }

    fn len(&self, text: &[char]) -> usize {
        match self {
            Lcs::BitParallel { masks, len } => {
                let mut v = u64::MAX;
                for c in text {
                    let m = masks.get(c).copied().unwrap_or(0);
                    let u = v & m;
                    v = v.wrapping_add(u) | (v & !m);
                }
                let window = if *len == 64 {
                    u64::MAX
                } else {
                    (1u64 << len) - 1
                };
                len - (v & window).count_ones() as usize
            }
            Lcs::Table(pattern) => {
                let mut prev = vec![0usize; text.len() + 1];
                let mut curr = vec![0usize; text.len() + 1];
                for a in pattern.iter() {
                    for (j, b) in text.iter().enumerate() {
                        curr[j + 1] = if a == b {
                            prev[j] + 1
                        } else {
                            prev[j + 1].max(curr[j])
                        };
                    }
                    std::mem::swap(&mut prev, &mut curr);
                }
                prev[text.len()]
            }
        }
    }
}
