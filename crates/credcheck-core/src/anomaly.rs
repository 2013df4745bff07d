//! Plausibility checks over extracted data and the best-ranked candidate.
//!
//! Anomaly detection is a pure function of (extracted fields, optional
//! best candidate, current year): independent of match quality, every
//! applicable rule fires, and flags accumulate without short-circuiting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matcher::match_name;
use crate::model::{ExtractedFields, MatchCandidate};

/// A detected inconsistency in extracted data or its registry pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyFlag {
    FutureDate,
    InvalidDate,
    InvalidYearFormat,
    InvalidPercentageFormat,
    GradePercentageMismatch,
    InactiveInstitution,
    CertNumberNameMismatch,
    CertNumberYearMismatch,
}

impl AnomalyFlag {
    /// Symbolic name persisted in logs and suspicious-activity rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FutureDate => "FUTURE_DATE",
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidYearFormat => "INVALID_YEAR_FORMAT",
            Self::InvalidPercentageFormat => "INVALID_PERCENTAGE_FORMAT",
            Self::GradePercentageMismatch => "GRADE_PERCENTAGE_MISMATCH",
            Self::InactiveInstitution => "INACTIVE_INSTITUTION",
            Self::CertNumberNameMismatch => "CERT_NUMBER_NAME_MISMATCH",
            Self::CertNumberYearMismatch => "CERT_NUMBER_YEAR_MISMATCH",
        }
    }
}

impl fmt::Display for AnomalyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected percentage band per letter grade: (grade, min, exclusive max).
/// Grades outside this table (A+, B+, distinctions) are not checked.
const GRADE_BANDS: &[(&str, f64, f64)] = &[
    ("A", 80.0, f64::INFINITY),
    ("B", 60.0, 80.0),
    ("C", 40.0, 60.0),
];

/// Name agreement required when certificate numbers match exactly.
const CERT_NAME_AGREEMENT: u32 = 95;

/// Oldest passing year the registry plausibly covers.
const MIN_PLAUSIBLE_YEAR: i32 = 1950;

/// Inspect extracted fields, and the best candidate when one exists, for
/// internally inconsistent or implausible values.
///
/// `current_year` is passed in rather than read from the clock so the
/// check stays pure. A field that fails to parse raises its format flag
/// and is treated as absent by the rules that would have consumed it;
/// one malformed field never blocks evaluation of the others.
pub fn detect(
    extracted: &ExtractedFields,
    best: Option<&MatchCandidate>,
    current_year: i32,
) -> Vec<AnomalyFlag> {
    let mut flags = Vec::new();

    if let Some(year) = extracted.year.as_deref() {
        match year.trim().parse::<i32>() {
            Ok(year) if year > current_year => flags.push(AnomalyFlag::FutureDate),
            Ok(year) if year < MIN_PLAUSIBLE_YEAR => flags.push(AnomalyFlag::InvalidDate),
            Ok(_) => {}
            Err(_) => flags.push(AnomalyFlag::InvalidYearFormat),
        }
    }

    if let (Some(grade), Some(percentage)) =
        (extracted.grade.as_deref(), extracted.percentage.as_deref())
    {
        match percentage.trim().parse::<f64>() {
            Ok(pct) => {
                let grade = grade.trim().to_uppercase();
                if let Some((_, min, max)) = GRADE_BANDS.iter().find(|(g, _, _)| *g == grade) {
                    if pct < *min || pct >= *max {
                        flags.push(AnomalyFlag::GradePercentageMismatch);
                    }
                }
            }
            Err(_) => flags.push(AnomalyFlag::InvalidPercentageFormat),
        }
    }

    if let Some(candidate) = best {
        if !candidate.record.institution.active {
            flags.push(AnomalyFlag::InactiveInstitution);
        }

        let cert_number_identical = extracted
            .certificate_number
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(&candidate.record.certificate_number));
        if cert_number_identical {
            // An identical certificate number pins the record: the rest of
            // the document must agree with it.
            if let Some(name) = extracted.student_name.as_deref() {
                if match_name(name, &candidate.record.student_name) < CERT_NAME_AGREEMENT {
                    flags.push(AnomalyFlag::CertNumberNameMismatch);
                }
            }
            if let Some(Ok(year)) = extracted
                .year
                .as_deref()
                .map(|y| y.trim().parse::<i32>())
            {
                if year != candidate.record.passing_year {
                    flags.push(AnomalyFlag::CertNumberYearMismatch);
                }
            }
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstitutionRef, MatchDetails, RegistryRecord};

    const CURRENT_YEAR: i32 = 2026;

    fn candidate(active: bool) -> MatchCandidate {
        MatchCandidate {
            record: RegistryRecord {
                id: 1,
                certificate_number: "RU/2023/BSC/001234".into(),
                student_name: "Rahul Kumar Singh".into(),
                roll_number: None,
                course_name: "Bachelor of Science in Computer Science".into(),
                degree_type: "Bachelor".into(),
                passing_year: 2023,
                grade: Some("A".into()),
                percentage: Some(85.5),
                institution: InstitutionRef {
                    id: 1,
                    name: "Ranchi University".into(),
                    active,
                },
            },
            score: 75,
            details: MatchDetails::new(),
        }
    }

    #[test]
    fn clean_extraction_raises_nothing() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            student_name: Some("Rahul Kumar Singh".into()),
            year: Some("2023".into()),
            grade: Some("A".into()),
            percentage: Some("85.5".into()),
            ..Default::default()
        };
        assert!(detect(&extracted, Some(&candidate(true)), CURRENT_YEAR).is_empty());
    }

    #[test]
    fn future_year_flagged() {
        let extracted = ExtractedFields {
            year: Some((CURRENT_YEAR + 5).to_string()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, None, CURRENT_YEAR),
            [AnomalyFlag::FutureDate]
        );
    }

    #[test]
    fn ancient_year_flagged() {
        let extracted = ExtractedFields {
            year: Some("1932".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, None, CURRENT_YEAR),
            [AnomalyFlag::InvalidDate]
        );
    }

    #[test]
    fn non_numeric_year_flagged() {
        let extracted = ExtractedFields {
            year: Some("MMXXIII".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, None, CURRENT_YEAR),
            [AnomalyFlag::InvalidYearFormat]
        );
    }

    #[test]
    fn grade_a_at_70_percent_flagged() {
        let extracted = ExtractedFields {
            grade: Some("A".into()),
            percentage: Some("70".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, None, CURRENT_YEAR),
            [AnomalyFlag::GradePercentageMismatch]
        );
    }

    #[test]
    fn grade_b_band_boundaries() {
        for (pct, expect_flag) in [("60", false), ("79.9", false), ("80", true), ("59.9", true)] {
            let extracted = ExtractedFields {
                grade: Some("b".into()),
                percentage: Some(pct.into()),
                ..Default::default()
            };
            let flags = detect(&extracted, None, CURRENT_YEAR);
            assert_eq!(
                flags.contains(&AnomalyFlag::GradePercentageMismatch),
                expect_flag,
                "grade B at {pct}%"
            );
        }
    }

    #[test]
    fn unknown_grade_not_checked() {
        let extracted = ExtractedFields {
            grade: Some("A+".into()),
            percentage: Some("10".into()),
            ..Default::default()
        };
        assert!(detect(&extracted, None, CURRENT_YEAR).is_empty());
    }

    #[test]
    fn non_numeric_percentage_flagged_only_with_grade() {
        let both = ExtractedFields {
            grade: Some("A".into()),
            percentage: Some("eighty-five".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&both, None, CURRENT_YEAR),
            [AnomalyFlag::InvalidPercentageFormat]
        );

        let percentage_only = ExtractedFields {
            percentage: Some("eighty-five".into()),
            ..Default::default()
        };
        assert!(detect(&percentage_only, None, CURRENT_YEAR).is_empty());
    }

    #[test]
    fn inactive_institution_flagged() {
        let extracted = ExtractedFields::default();
        assert_eq!(
            detect(&extracted, Some(&candidate(false)), CURRENT_YEAR),
            [AnomalyFlag::InactiveInstitution]
        );
    }

    #[test]
    fn identical_cert_number_with_wrong_name_flagged() {
        let extracted = ExtractedFields {
            certificate_number: Some("ru/2023/bsc/001234".into()),
            student_name: Some("Deepika Verma".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, Some(&candidate(true)), CURRENT_YEAR),
            [AnomalyFlag::CertNumberNameMismatch]
        );
    }

    #[test]
    fn identical_cert_number_with_wrong_year_flagged() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            year: Some("2021".into()),
            ..Default::default()
        };
        assert_eq!(
            detect(&extracted, Some(&candidate(true)), CURRENT_YEAR),
            [AnomalyFlag::CertNumberYearMismatch]
        );
    }

    #[test]
    fn malformed_year_skips_cert_year_comparison() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            year: Some("two thousand".into()),
            ..Default::default()
        };
        let flags = detect(&extracted, Some(&candidate(true)), CURRENT_YEAR);
        assert_eq!(flags, [AnomalyFlag::InvalidYearFormat]);
    }

    #[test]
    fn different_cert_number_skips_pinned_checks() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2020/BA/999999".into()),
            student_name: Some("Deepika Verma".into()),
            year: Some("2020".into()),
            ..Default::default()
        };
        assert!(detect(&extracted, Some(&candidate(true)), CURRENT_YEAR).is_empty());
    }

    #[test]
    fn rules_accumulate_without_short_circuit() {
        let extracted = ExtractedFields {
            certificate_number: Some("RU/2023/BSC/001234".into()),
            student_name: Some("Deepika Verma".into()),
            year: Some((CURRENT_YEAR + 2).to_string()),
            grade: Some("A".into()),
            percentage: Some("50".into()),
            ..Default::default()
        };
        let flags = detect(&extracted, Some(&candidate(false)), CURRENT_YEAR);
        assert!(flags.contains(&AnomalyFlag::FutureDate));
        assert!(flags.contains(&AnomalyFlag::GradePercentageMismatch));
        assert!(flags.contains(&AnomalyFlag::InactiveInstitution));
        assert!(flags.contains(&AnomalyFlag::CertNumberNameMismatch));
        assert!(flags.contains(&AnomalyFlag::CertNumberYearMismatch));
        assert_eq!(flags.len(), 5);
    }
}
