//! Course records and the values derived from them at load time.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Target share of each gender the platform steers enrollment towards
pub const TARGET_GENDER_SHARE: f64 = 0.8;

/// A catalog row as it arrives from the ingestion layer.
///
/// English field names are canonical; the German column names of the source
/// export are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourseRecord {
    pub guid: String,

    #[serde(alias = "name", alias = "course_name")]
    pub course_name_german: String,

    #[serde(default)]
    pub course_name_translated: Option<String>,

    #[serde(default, alias = "untertitel")]
    pub course_subtitle: Option<String>,

    #[serde(default, alias = "schlagwort", deserialize_with = "keywords")]
    pub keywords: Vec<String>,

    /// Composite search text; derived from name, subtitle and keywords when absent
    #[serde(default)]
    pub search_text: Option<String>,

    #[serde(default, alias = "preis_betrag")]
    pub price_amount: f64,

    #[serde(default, alias = "aktuelle_teilnehmerzahl")]
    pub current_participants: u32,

    #[serde(default, alias = "minimale_teilnehmerzahl")]
    pub minimum_participants: u32,

    #[serde(default, alias = "maximale_teilnehmerzahl")]
    pub maximum_participants: u32,

    #[serde(default, alias = "number_of_women")]
    pub women_participants: u32,

    #[serde(default)]
    pub sponsored: bool,

    /// Target group column names this course is flagged for
    #[serde(default)]
    pub target_groups: Vec<String>,

    /// Single raw target group, as found in the source export
    #[serde(default, alias = "zielgruppe")]
    pub target_group: Option<String>,
}

/// Accepts either a list of keywords or one comma separated string.
fn keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Keywords>::deserialize(deserializer)? {
        Some(Keywords::List(list)) => list,
        Some(Keywords::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    })
}

/// Enrollment counts for a course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrollment {
    pub current: u32,
    pub minimum: u32,
    pub maximum: u32,
}

/// An immutable catalog entry.
///
/// Occupancy ratios and demographic gaps are computed once in
/// [`Course::from_record`] and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub guid: String,
    pub name_native: String,
    pub name_translated: Option<String>,
    pub subtitle: Option<String>,
    pub keywords: Vec<String>,
    pub search_text: String,
    pub price: f64,
    pub enrollment: Enrollment,
    /// Share of capacity still free, `(max - current) / max`
    pub prop_occupancy_left: f64,
    /// Share still missing to reach the minimum, floored at 0
    pub prop_minimum_to_reach: f64,
    pub gap_to_80_percent_women: f64,
    pub gap_to_80_percent_men: f64,
    pub sponsored: bool,
    pub target_groups: BTreeSet<String>,
}

impl Course {
    /// Build a course from a raw record, deriving every computed column.
    pub fn from_record(record: CourseRecord) -> Self {
        let enrollment = Enrollment {
            current: record.current_participants,
            minimum: record.minimum_participants,
            maximum: record.maximum_participants,
        };

        let search_text = record
            .search_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| {
                compose_search_text(
                    &record.course_name_german,
                    record.course_subtitle.as_deref(),
                    &record.keywords,
                )
            });

        let share_women = if enrollment.current > 0 {
            f64::from(record.women_participants.min(enrollment.current))
                / f64::from(enrollment.current)
        } else {
            0.0
        };

        let mut target_groups: BTreeSet<String> = record
            .target_groups
            .into_iter()
            .map(|group| group.trim().to_string())
            .filter(|group| !group.is_empty())
            .collect();
        if let Some(group) = record.target_group.map(|g| g.trim().to_string())
            && !group.is_empty()
        {
            target_groups.insert(group);
        }

        Self {
            guid: record.guid,
            name_native: record.course_name_german,
            name_translated: record.course_name_translated,
            subtitle: record.course_subtitle,
            keywords: record.keywords,
            search_text,
            price: record.price_amount,
            prop_occupancy_left: occupancy_left(&enrollment),
            prop_minimum_to_reach: minimum_to_reach(&enrollment),
            enrollment,
            gap_to_80_percent_women: TARGET_GENDER_SHARE - share_women,
            gap_to_80_percent_men: TARGET_GENDER_SHARE - (1.0 - share_women),
            sponsored: record.sponsored,
            target_groups,
        }
    }

    /// The searchable text fields, in the order the lexical matcher checks them.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name_native.as_str())
            .chain(self.name_translated.as_deref())
            .chain(std::iter::once(self.search_text.as_str()))
    }

    /// Whether this course carries the flag for the given target group column.
    pub fn in_target_group(&self, column: &str) -> bool {
        self.target_groups.contains(column)
    }
}

fn compose_search_text(name: &str, subtitle: Option<&str>, keywords: &[String]) -> String {
    let keywords = keywords.join(", ");
    [name, subtitle.unwrap_or_default(), keywords.as_str()]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn occupancy_left(enrollment: &Enrollment) -> f64 {
    if enrollment.maximum == 0 {
        return 0.0;
    }
    (f64::from(enrollment.maximum) - f64::from(enrollment.current)) / f64::from(enrollment.maximum)
}

fn minimum_to_reach(enrollment: &Enrollment) -> f64 {
    if enrollment.minimum == 0 {
        return 0.0;
    }
    ((f64::from(enrollment.minimum) - f64::from(enrollment.current))
        / f64::from(enrollment.minimum))
    .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CourseRecord {
        CourseRecord {
            guid: "c-1".to_string(),
            course_name_german: "Yoga für Anfänger".to_string(),
            course_subtitle: Some("Entspannung".to_string()),
            keywords: vec!["Yoga".to_string(), "Gesundheit".to_string()],
            price_amount: 80.0,
            current_participants: 5,
            minimum_participants: 8,
            maximum_participants: 20,
            women_participants: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_derived_ratios() {
        let course = Course::from_record(record());

        assert!((course.prop_occupancy_left - 0.75).abs() < 1e-9);
        assert!((course.prop_minimum_to_reach - 0.375).abs() < 1e-9);
        assert!((course.gap_to_80_percent_women - 0.0).abs() < 1e-9);
        assert!((course.gap_to_80_percent_men - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_reached_is_floored_at_zero() {
        let course = Course::from_record(CourseRecord {
            current_participants: 12,
            ..record()
        });
        assert_eq!(course.prop_minimum_to_reach, 0.0);
    }

    #[test]
    fn test_zero_capacity_does_not_produce_nan() {
        let course = Course::from_record(CourseRecord {
            current_participants: 0,
            minimum_participants: 0,
            maximum_participants: 0,
            women_participants: 0,
            ..record()
        });
        assert_eq!(course.prop_occupancy_left, 0.0);
        assert_eq!(course.prop_minimum_to_reach, 0.0);
        assert!((course.gap_to_80_percent_women - 0.8).abs() < 1e-9);
        assert!((course.gap_to_80_percent_men + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_search_text_is_composed_when_missing() {
        let course = Course::from_record(record());
        assert_eq!(course.search_text, "Yoga für Anfänger Entspannung Yoga, Gesundheit");

        let course = Course::from_record(CourseRecord {
            search_text: Some("custom text".to_string()),
            ..record()
        });
        assert_eq!(course.search_text, "custom text");
    }

    #[test]
    fn test_german_aliases_and_joined_keywords() {
        let json = r#"{
            "guid": "g-7",
            "name": "Deutsch A1",
            "untertitel": "Grundkurs",
            "schlagwort": "Sprache, Deutsch",
            "preis_betrag": 120.5,
            "aktuelle_teilnehmerzahl": 3,
            "minimale_teilnehmerzahl": 6,
            "maximale_teilnehmerzahl": 15,
            "zielgruppe": "Menschen mit Migrationshintergrund"
        }"#;

        let record: CourseRecord = serde_json::from_str(json).unwrap();
        let course = Course::from_record(record);

        assert_eq!(course.name_native, "Deutsch A1");
        assert_eq!(course.keywords, vec!["Sprache", "Deutsch"]);
        assert_eq!(course.price, 120.5);
        assert_eq!(course.enrollment.maximum, 15);
        assert!(course.in_target_group("Menschen mit Migrationshintergrund"));
    }

    #[test]
    fn test_searchable_fields_skip_missing_translation() {
        let course = Course::from_record(record());
        assert_eq!(course.searchable_fields().count(), 2);

        let course = Course::from_record(CourseRecord {
            course_name_translated: Some("Yoga for beginners".to_string()),
            ..record()
        });
        let fields: Vec<&str> = course.searchable_fields().collect();
        assert_eq!(fields[1], "Yoga for beginners");
    }
}
