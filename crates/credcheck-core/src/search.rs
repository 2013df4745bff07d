//! Weighted multi-field search over a registry snapshot.
//!
//! Scoring is driven by a declarative rule table: one [`FieldRule`] per
//! field, each naming its comparator, weight, and fallback weight. Weights
//! are tunable through [`SearchConfig`] without touching control flow, and
//! each row is testable on its own.

use tracing::debug;

use crate::matcher::{match_course, match_name};
use crate::model::{ExtractedFields, FieldMatch, MatchCandidate, MatchDetails, RegistryRecord};
use crate::similarity::ratio;

/// Which extracted/registry field pair a rule scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoredField {
    CertificateNumber,
    StudentName,
    RollNumber,
    Course,
    Year,
}

impl ScoredField {
    /// Key under which this field's contribution is recorded in
    /// [`MatchDetails`].
    pub fn key(self) -> &'static str {
        match self {
            Self::CertificateNumber => "certificate_number",
            Self::StudentName => "student_name",
            Self::RollNumber => "roll_number",
            Self::Course => "course",
            Self::Year => "year",
        }
    }
}

/// How a rule compares its field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Case-insensitive equality worth the full weight, with a
    /// character-ratio fallback worth the fallback weight above
    /// `threshold`.
    ExactOrSimilar { threshold: u32 },
    /// Case-insensitive equality only.
    Exact,
    /// Fuzzy name score above `threshold`.
    Name { threshold: u32 },
    /// Fuzzy course score above `threshold`.
    Course { threshold: u32 },
    /// Exact year worth the full weight; within `tolerance` years worth
    /// the fallback weight.
    YearWithin { tolerance: i32 },
}

/// One row of the scoring table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: ScoredField,
    pub comparator: Comparator,
    pub weight: u32,
    pub fallback_weight: u32,
}

/// Scoring table plus admission threshold.
///
/// `Default` carries the production weights (summing to 100 across exact
/// matches); tests construct narrower tables to probe single rows.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub rules: Vec<FieldRule>,
    /// Candidates scoring below this are discarded entirely.
    pub min_score: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                FieldRule {
                    field: ScoredField::CertificateNumber,
                    comparator: Comparator::ExactOrSimilar { threshold: 80 },
                    weight: 40,
                    fallback_weight: 20,
                },
                FieldRule {
                    field: ScoredField::StudentName,
                    comparator: Comparator::Name { threshold: 80 },
                    weight: 25,
                    fallback_weight: 0,
                },
                FieldRule {
                    field: ScoredField::RollNumber,
                    comparator: Comparator::Exact,
                    weight: 20,
                    fallback_weight: 0,
                },
                FieldRule {
                    field: ScoredField::Course,
                    comparator: Comparator::Course { threshold: 75 },
                    weight: 15,
                    fallback_weight: 0,
                },
                FieldRule {
                    field: ScoredField::Year,
                    comparator: Comparator::YearWithin { tolerance: 1 },
                    weight: 10,
                    fallback_weight: 5,
                },
            ],
            min_score: 30,
        }
    }
}

/// Scan a registry snapshot and rank records against the extracted fields.
///
/// Each rule contributes independently; missing extracted fields skip
/// their rows without penalty, and a malformed year contributes nothing.
/// Totals are capped at 100 so a record matching on every field (110 raw
/// points) still reports a score in 0..=100. Records totalling less than
/// `config.min_score` are dropped outright. The sort is stable and
/// descending, so equal scores keep snapshot order (snapshots are ordered
/// by record id). Empty inputs yield an empty Vec.
pub fn find_candidates(
    extracted: &ExtractedFields,
    registry: &[RegistryRecord],
    config: &SearchConfig,
) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = Vec::new();

    for record in registry {
        let mut score = 0;
        let mut details = MatchDetails::new();
        for rule in &config.rules {
            if let Some((points, detail)) = apply_rule(rule, extracted, record) {
                score += points;
                details.insert(rule.field.key().to_string(), detail);
            }
        }
        if score >= config.min_score {
            candidates.push(MatchCandidate {
                record: record.clone(),
                score: score.min(100),
                details,
            });
        }
    }

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(
        scanned = registry.len(),
        retained = candidates.len(),
        "ranked registry candidates"
    );
    candidates
}

/// Evaluate one table row against one record. `None` means the row did not
/// fire: a side was missing or no comparator cleared its threshold.
fn apply_rule(
    rule: &FieldRule,
    extracted: &ExtractedFields,
    record: &RegistryRecord,
) -> Option<(u32, FieldMatch)> {
    match rule.comparator {
        Comparator::ExactOrSimilar { threshold } => {
            let value = extracted_value(rule.field, extracted)?;
            let target = registry_value(rule.field, record)?;
            if value.eq_ignore_ascii_case(target) {
                Some((rule.weight, FieldMatch::Exact))
            } else if ratio(&value.to_uppercase(), &target.to_uppercase()) > threshold {
                Some((rule.fallback_weight, FieldMatch::Partial))
            } else {
                None
            }
        }
        Comparator::Exact => {
            let value = extracted_value(rule.field, extracted)?;
            let target = registry_value(rule.field, record)?;
            value
                .eq_ignore_ascii_case(target)
                .then_some((rule.weight, FieldMatch::Exact))
        }
        Comparator::Name { threshold } => {
            let value = extracted_value(rule.field, extracted)?;
            let target = registry_value(rule.field, record)?;
            let score = match_name(value, target);
            (score > threshold).then_some((rule.weight, FieldMatch::Score(score)))
        }
        Comparator::Course { threshold } => {
            let value = extracted_value(rule.field, extracted)?;
            let target = registry_value(rule.field, record)?;
            let score = match_course(value, target);
            (score > threshold).then_some((rule.weight, FieldMatch::Score(score)))
        }
        Comparator::YearWithin { tolerance } => {
            let value = extracted_value(rule.field, extracted)?;
            let year: i32 = value.trim().parse().ok()?;
            if year == record.passing_year {
                Some((rule.weight, FieldMatch::Exact))
            } else if (year - record.passing_year).abs() <= tolerance {
                Some((rule.fallback_weight, FieldMatch::Close))
            } else {
                None
            }
        }
    }
}

fn extracted_value(field: ScoredField, extracted: &ExtractedFields) -> Option<&str> {
    match field {
        ScoredField::CertificateNumber => extracted.certificate_number.as_deref(),
        ScoredField::StudentName => extracted.student_name.as_deref(),
        ScoredField::RollNumber => extracted.roll_number.as_deref(),
        ScoredField::Course => extracted.course.as_deref(),
        ScoredField::Year => extracted.year.as_deref(),
    }
}

fn registry_value(field: ScoredField, record: &RegistryRecord) -> Option<&str> {
    match field {
        ScoredField::CertificateNumber => Some(&record.certificate_number),
        ScoredField::StudentName => Some(&record.student_name),
        ScoredField::RollNumber => record.roll_number.as_deref(),
        ScoredField::Course => Some(&record.course_name),
        // Years are compared numerically inside the comparator.
        ScoredField::Year => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstitutionRef;

    fn record(id: i64) -> RegistryRecord {
        RegistryRecord {
            id,
            certificate_number: "RU/2023/BSC/001234".into(),
            student_name: "Rahul Kumar Singh".into(),
            roll_number: Some("RU23BSC001234".into()),
            course_name: "Bachelor of Science in Computer Science".into(),
            degree_type: "Bachelor".into(),
            passing_year: 2023,
            grade: Some("A".into()),
            percentage: Some(85.5),
            institution: InstitutionRef {
                id: 1,
                name: "Ranchi University".into(),
                active: true,
            },
        }
    }

    fn extraction() -> ExtractedFields {
        ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            student_name: Some("Rahul Kumar Singh".into()),
            roll_number: Some("RU23BSC001234".into()),
            course: Some("Bachelor of Science in Computer Science".into()),
            year: Some("2023".into()),
            ..Default::default()
        }
    }

    #[test]
    fn all_fields_exact_scores_100() {
        let registry = vec![record(1)];
        let candidates = find_candidates(&extraction(), &registry, &SearchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 100);
        assert_eq!(
            candidates[0].details.get("certificate_number"),
            Some(&FieldMatch::Exact)
        );
        assert_eq!(
            candidates[0].details.get("student_name"),
            Some(&FieldMatch::Score(100))
        );
        assert_eq!(candidates[0].details.get("roll_number"), Some(&FieldMatch::Exact));
        assert_eq!(candidates[0].details.get("year"), Some(&FieldMatch::Exact));
    }

    #[test]
    fn cert_name_year_scores_75() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            student_name: Some("Rahul Kumar Singh".into()),
            year: Some("2023".into()),
            ..Default::default()
        };
        let registry = vec![record(1)];
        let candidates = find_candidates(&extracted, &registry, &SearchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 40 + 25 + 10);
    }

    #[test]
    fn cert_number_case_insensitive() {
        let extracted = ExtractedFields {
            certificate_number: Some("ru/2023/bsc/001234".into()),
            ..Default::default()
        };
        let candidates = find_candidates(&extracted, &[record(1)], &SearchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 40);
    }

    #[test]
    fn near_miss_cert_number_earns_fallback() {
        // One transposed digit: high ratio, not equal.
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001243".into()),
            student_name: Some("Rahul Kumar Singh".into()),
            ..Default::default()
        };
        let candidates = find_candidates(&extracted, &[record(1)], &SearchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 20 + 25);
        assert_eq!(
            candidates[0].details.get("certificate_number"),
            Some(&FieldMatch::Partial)
        );
    }

    #[test]
    fn adjacent_year_earns_half_weight() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            year: Some("2024".into()),
            ..Default::default()
        };
        let candidates = find_candidates(&extracted, &[record(1)], &SearchConfig::default());
        assert_eq!(candidates[0].score, 40 + 5);
        assert_eq!(candidates[0].details.get("year"), Some(&FieldMatch::Close));
    }

    #[test]
    fn malformed_year_contributes_nothing() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            year: Some("twenty23".into()),
            ..Default::default()
        };
        let candidates = find_candidates(&extracted, &[record(1)], &SearchConfig::default());
        assert_eq!(candidates[0].score, 40);
        assert!(!candidates[0].details.contains_key("year"));
    }

    #[test]
    fn registry_without_roll_number_skips_row() {
        let mut rec = record(1);
        rec.roll_number = None;
        let candidates = find_candidates(&extraction(), &[rec], &SearchConfig::default());
        assert_eq!(candidates[0].score, 40 + 25 + 15 + 10);
        assert!(!candidates[0].details.contains_key("roll_number"));
    }

    #[test]
    fn weak_records_are_discarded_not_ranked_low() {
        // Only the year matches: 10 points, below the admission threshold.
        let extracted = ExtractedFields {
            year: Some("2023".into()),
            ..Default::default()
        };
        let candidates = find_candidates(&extracted, &[record(1)], &SearchConfig::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let strong = record(1);
        let mut weak = record(2);
        weak.certificate_number = "XX/9999/ZZZ/000000".into();
        weak.student_name = "Rahul Kumar Singh".into();
        let tie_a = record(3);
        let tie_b = record(4);

        let registry = vec![weak.clone(), strong.clone(), tie_a.clone(), tie_b.clone()];
        let candidates = find_candidates(&extraction(), &registry, &SearchConfig::default());

        let scores: Vec<u32> = candidates.iter().map(|c| c.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted, "scores must be non-increasing");
        assert!(candidates.iter().all(|c| c.score >= 30));

        // Records 1, 3, 4 tie at 100 and must keep snapshot order.
        let tied: Vec<i64> = candidates
            .iter()
            .filter(|c| c.score == 100)
            .map(|c| c.record.id)
            .collect();
        assert_eq!(tied, [1, 3, 4]);
    }

    #[test]
    fn empty_registry_and_empty_extraction_yield_empty() {
        assert!(find_candidates(&extraction(), &[], &SearchConfig::default()).is_empty());
        assert!(
            find_candidates(
                &ExtractedFields::default(),
                &[record(1)],
                &SearchConfig::default()
            )
            .is_empty()
        );
    }
}
