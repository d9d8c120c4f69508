//! Platform-side preference ranking.
//!
//! Orders a candidate set by suitability for the platform rather than by query
//! relevance: free capacity, distance to the minimum viable enrollment and
//! the gender balance gap for the caller's gender, with a boost for sponsored
//! courses and courses flagged for the caller's target groups.

use crate::catalog::Catalog;
use crate::config::PlatformConfig;
use crate::search::Candidate;
use crate::{CourseRankError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Slight overweighting of boosted rows, enough to overturn close numeric
/// ties without dominating the ranking.
pub const BOOST_MULTIPLIER: f64 = 1.05;

/// Caller gender, selecting which balance gap column counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// `female`, `f`, `woman` and `w` (any case) are female, any other
    /// non-empty value male. Blank input is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "" => None,
            "female" | "f" | "woman" | "w" => Some(Gender::Female),
            _ => Some(Gender::Male),
        }
    }
}

/// Required caller inputs for the platform ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformPreferences {
    pub gender: Gender,

    /// Public-facing target group labels; may be empty but must be given
    pub target_groups: Vec<String>,
}

impl PlatformPreferences {
    pub fn new(gender: Option<&str>, target_groups: Option<&[String]>) -> Result<Self> {
        let gender = gender.and_then(Gender::parse).ok_or_else(|| {
            CourseRankError::MissingPreferences(
                "gender is required. Please fill in the gender field before proceeding".to_string(),
            )
        })?;
        let target_groups = target_groups.ok_or_else(|| {
            CourseRankError::MissingPreferences(
                "target group selection is required (an empty selection is allowed)".to_string(),
            )
        })?;

        Ok(Self {
            gender,
            target_groups: target_groups.to_vec(),
        })
    }
}

/// Platform-side scores for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformScore {
    pub guid: String,

    /// Capacity left + share to minimum + gender gap
    pub numeric_score: f64,

    /// 0-based position when sorted by `numeric_score`
    pub rank_index: usize,

    /// Number of boost indicators set
    pub binary_sum: u32,

    pub weight: f64,

    /// `numeric_score + weight × binary_sum`
    pub platform_score: f64,

    /// 1-based position in the platform ranking
    pub platform_rank: usize,
}

/// Ranks candidates by platform suitability.
#[derive(Debug, Clone)]
pub struct PreferenceRanker {
    target_groups: BTreeMap<String, String>,
    women_group_label: Option<String>,
}

impl PreferenceRanker {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            target_groups: config.target_groups.clone(),
            women_group_label: config.women_group_label.clone(),
        }
    }

    /// Catalog columns counted as boost indicators besides sponsorship.
    ///
    /// Unknown labels are skipped; female callers get the women group added.
    pub fn boost_columns(&self, preferences: &PlatformPreferences) -> Vec<String> {
        let mut labels = preferences.target_groups.clone();
        if preferences.gender == Gender::Female
            && let Some(women) = &self.women_group_label
            && !labels.contains(women)
        {
            labels.push(women.clone());
        }

        let mut columns: Vec<String> = Vec::new();
        for label in &labels {
            match self.target_groups.get(label) {
                Some(column) if !columns.contains(column) => columns.push(column.clone()),
                Some(_) => {}
                None => debug!(label = %label, "Ignoring unknown target group label"),
            }
        }
        columns
    }

    /// Rank `candidates` (given in user order) by platform suitability.
    ///
    /// Both sorts are stable, so ties keep the user order.
    pub fn rank(
        &self,
        candidates: &[Candidate],
        preferences: &PlatformPreferences,
        catalog: &Catalog,
    ) -> Vec<PlatformScore> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let columns = self.boost_columns(preferences);
        for column in columns.iter().filter(|c| !catalog.has_target_group_column(c)) {
            debug!(column = %column, "Target group column absent from catalog; counted as 0");
        }

        let mut scored: Vec<(&Candidate, f64)> = candidates
            .iter()
            .map(|c| (c, Self::numeric_score(c, preferences.gender)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let max_score = scored.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
        let min_score = scored.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
        let total = scored.len() as f64;

        let mut ranked: Vec<PlatformScore> = scored
            .into_iter()
            .enumerate()
            .map(|(rank_index, (candidate, numeric_score))| {
                let course = &candidate.course;
                let binary_sum = u32::from(course.sponsored)
                    + columns
                        .iter()
                        .map(|column| u32::from(course.in_target_group(column)))
                        .sum::<u32>();

                let weight = if rank_index > 0 {
                    (max_score - numeric_score) / rank_index as f64 * BOOST_MULTIPLIER
                } else {
                    (max_score - min_score) / total * BOOST_MULTIPLIER
                };

                PlatformScore {
                    guid: course.guid.clone(),
                    numeric_score,
                    rank_index,
                    binary_sum,
                    weight,
                    platform_score: numeric_score + weight * f64::from(binary_sum),
                    platform_rank: 0,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.platform_score.total_cmp(&a.platform_score));
        for (i, score) in ranked.iter_mut().enumerate() {
            score.platform_rank = i + 1;
        }

        debug!(
            candidates = ranked.len(),
            boost_columns = columns.len(),
            "Platform ranking built"
        );
        ranked
    }

    fn numeric_score(candidate: &Candidate, gender: Gender) -> f64 {
        let course = &candidate.course;
        let gap = match gender {
            Gender::Female => course.gap_to_80_percent_women,
            Gender::Male => course.gap_to_80_percent_men,
        };
        course.prop_occupancy_left + course.prop_minimum_to_reach + gap
    }
}
