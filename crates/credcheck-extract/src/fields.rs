//! Regex field patterns over certificate text.
//!
//! Certificates from different boards label the same data differently
//! ("Certificate No", "Reg. No", "Roll No", "Session"), so each field
//! carries an ordered pattern list and the first pattern that matches
//! anywhere in the document wins.

use std::sync::LazyLock;

use regex::Regex;

use credcheck_core::ExtractedFields;

const CERTIFICATE_NUMBER: &[&str] = &[
    r"certificate\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
    r"cert\.?\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
    r"registration\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
    r"reg\.?\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
];

const STUDENT_NAME: &[&str] = &[
    r"student\s+name\s*:?\s*([a-z\s]+)",
    r"name\s*:?\s*([a-z\s]+)",
    r"this\s+is\s+to\s+certify\s+that\s+([a-z\s]+)",
    r"mr\.?\s*/?\s*ms\.?\s*([a-z\s]+)",
];

const ROLL_NUMBER: &[&str] = &[
    r"roll\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
    r"enrollment\s+no\.?\s*:?\s*([a-z0-9/\-]+)",
    r"student\s+id\s*:?\s*([a-z0-9/\-]+)",
];

const COURSE: &[&str] = &[
    r"course\s*:?\s*([a-z\s]+)",
    r"degree\s*:?\s*([a-z\s]+)",
    r"(bachelor\s+of\s+[a-z\s]+)",
    r"(master\s+of\s+[a-z\s]+)",
    r"(diploma\s+in\s+[a-z\s]+)",
];

const YEAR: &[&str] = &[
    r"passing\s+year\s*:?\s*(\d{4})",
    r"year\s*:?\s*(\d{4})",
    r"session\s*:?\s*(\d{4})",
    r"(\d{4})\s*session",
];

const GRADE: &[&str] = &[
    r"grade\s*:?\s*([a-z]+)",
    r"class\s*:?\s*([a-z\s]+)",
    r"division\s*:?\s*([a-z\s]+)",
];

const PERCENTAGE: &[&str] = &[
    r"(\d+\.?\d*)\s*%",
    r"marks?\s*:?\s*(\d+\.?\d*)",
    r"percentage\s*:?\s*(\d+\.?\d*)",
];

struct FieldPatterns {
    certificate_number: Vec<Regex>,
    student_name: Vec<Regex>,
    roll_number: Vec<Regex>,
    course: Vec<Regex>,
    year: Vec<Regex>,
    grade: Vec<Regex>,
    percentage: Vec<Regex>,
}

static PATTERNS: LazyLock<FieldPatterns> = LazyLock::new(|| FieldPatterns {
    certificate_number: compile(CERTIFICATE_NUMBER),
    student_name: compile(STUDENT_NAME),
    roll_number: compile(ROLL_NUMBER),
    course: compile(COURSE),
    year: compile(YEAR),
    grade: compile(GRADE),
    percentage: compile(PERCENTAGE),
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("field pattern is a valid regex"))
        .collect()
}

/// Pull structured fields out of raw document text.
///
/// Lines are lower-cased and whitespace-collapsed individually, so greedy
/// captures stop at line ends instead of swallowing the next label.
pub fn parse_fields(text: &str) -> ExtractedFields {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            line.to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    ExtractedFields {
        certificate_number: first_capture(&PATTERNS.certificate_number, &lines),
        student_name: first_capture(&PATTERNS.student_name, &lines),
        roll_number: first_capture(&PATTERNS.roll_number, &lines),
        course: first_capture(&PATTERNS.course, &lines),
        year: first_capture(&PATTERNS.year, &lines),
        grade: first_capture(&PATTERNS.grade, &lines),
        percentage: first_capture(&PATTERNS.percentage, &lines),
    }
}

fn first_capture(patterns: &[Regex], lines: &[String]) -> Option<String> {
    for pattern in patterns {
        for line in lines {
            if let Some(value) = pattern
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty())
            {
                return Some(value);
            }
        }
    }
    None
}
