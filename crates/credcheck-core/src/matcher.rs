//! Per-field similarity scoring between extracted and registry values.

use crate::normalize::normalize;
use crate::similarity::{partial_ratio, ratio, token_sort_ratio};

/// Score two student names in 0..=100.
///
/// Three measures are computed after normalisation and the best one wins:
/// the raw character ratio, a token-order-insensitive ratio (word order in
/// names varies between documents), and a partial ratio (one side is often
/// a truncation of the other). A single strong signal is enough to match.
/// Either side empty scores 0; matching is not attempted.
pub fn match_name(extracted: &str, registry: &str) -> u32 {
    let a = normalize(extracted);
    let b = normalize(registry);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    ratio(&a, &b)
        .max(token_sort_ratio(&a, &b))
        .max(partial_ratio(&a, &b))
}

/// Score two course names in 0..=100.
///
/// Course titles reorder their tokens more than they change them
/// ("Computer Science Engineering" vs "Engineering in Computer Science"),
/// so only the token-order-insensitive ratio is used. Either side empty
/// scores 0.
pub fn match_course(extracted: &str, registry: &str) -> u32 {
    let a = normalize(extracted);
    let b = normalize(registry);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    token_sort_ratio(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_100() {
        assert_eq!(match_name("Rahul Kumar Singh", "Rahul Kumar Singh"), 100);
    }

    #[test]
    fn honorific_does_not_hurt_name_score() {
        assert_eq!(match_name("Mr. Rahul Kumar Singh", "Rahul Kumar Singh"), 100);
    }

    #[test]
    fn reordered_name_scores_100() {
        assert_eq!(match_name("Singh Rahul Kumar", "Rahul Kumar Singh"), 100);
    }

    #[test]
    fn truncated_name_scores_100_via_partial() {
        assert_eq!(match_name("Rahul Kumar", "Rahul Kumar Singh"), 100);
    }

    #[test]
    fn empty_inputs_score_0() {
        assert_eq!(match_name("", "Rahul Kumar Singh"), 0);
        assert_eq!(match_name("Rahul", ""), 0);
        assert_eq!(match_course("", "Computer Science"), 0);
        assert_eq!(match_course("   ", "Computer Science"), 0);
    }

    #[test]
    fn different_names_score_low() {
        assert!(match_name("Rahul Kumar Singh", "Deepika Verma") < 50);
    }

    #[test]
    fn course_reorder_scores_high() {
        let score = match_course(
            "Engineering in Computer Science",
            "Computer Science Engineering",
        );
        assert!(score > 75, "reordered course should clear threshold, got {score}");
    }

    #[test]
    fn unrelated_courses_score_low() {
        assert!(match_course("Bachelor of Arts in English", "Diploma in Mechanical Engineering") < 60);
    }
}
