//! Card and table rendering for verification results and registry listings.

use credcheck_core::FieldMatch;
use credcheck_engine::VerificationReport;
use credcheck_store::{
    CertificateRow, InstitutionRow, SuspiciousActivityRow, VerificationRow, VerificationStats,
};

const RULE: &str = "────────────────────────────────────────────────────";

fn heading(title: &str) {
    println!("{RULE}");
    println!("{title}");
    println!("{RULE}");
}

fn field(label: &str, value: &str) {
    println!("  {label:<22} {value}");
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Verdict card for one verification attempt.
pub fn report_card(report: &VerificationReport) {
    heading(&format!(
        "VERDICT: {}   (confidence {}%)",
        report.verdict, report.confidence
    ));

    if let Some(message) = &report.message {
        field("message", message);
    }
    if let Some(error) = &report.error {
        field("error", error);
    }

    let extracted = &report.extracted;
    if !extracted.is_empty() {
        println!("Extracted fields");
        field("certificate number", opt(&extracted.certificate_number));
        field("student name", opt(&extracted.student_name));
        field("roll number", opt(&extracted.roll_number));
        field("course", opt(&extracted.course));
        field("year", opt(&extracted.year));
        field("grade", opt(&extracted.grade));
        field("percentage", opt(&extracted.percentage));
    }

    if report.flags.is_empty() {
        println!("Flags: none");
    } else {
        println!("Flags");
        for flag in report.flags.iter() {
            println!("  - {flag}");
        }
    }

    match &report.matched {
        Some(matched) => {
            println!("Matched registry record (score {})", matched.match_score);
            field("certificate number", &matched.certificate_number);
            field("student name", &matched.student_name);
            field("course", &matched.course_name);
            field("institution", &matched.institution_name);
            field("passing year", &matched.passing_year.to_string());
            for (name, detail) in &matched.match_details {
                field(name, &match_detail(detail));
            }
        }
        None => println!("No registry record matched"),
    }

    if let Some(log_id) = report.log_id {
        field("log id", &log_id.to_string());
    }
}

fn match_detail(detail: &FieldMatch) -> String {
    match detail {
        FieldMatch::Exact => "EXACT".to_string(),
        FieldMatch::Partial => "PARTIAL".to_string(),
        FieldMatch::Close => "CLOSE".to_string(),
        FieldMatch::Score(score) => format!("score {score}"),
    }
}

pub fn institutions_table(institutions: &[InstitutionRow]) {
    heading(&format!("Institutions ({})", institutions.len()));
    for inst in institutions {
        let status = if inst.active { "active" } else { "INACTIVE" };
        let year = inst
            .established_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{:>3}] {:<40} {:<8} {:<12} est. {:<6} {}",
            inst.id, inst.name, inst.code, inst.kind, year, status
        );
    }
}

pub fn certificates_table(certificates: &[CertificateRow]) {
    heading(&format!("Certificates ({})", certificates.len()));
    for cert in certificates {
        println!(
            "  [{:>3}] {:<24} {:<28} {} ({}, {})",
            cert.id,
            cert.certificate_number,
            cert.student_name,
            cert.course_name,
            cert.institution_name,
            cert.passing_year
        );
    }
}

pub fn logs_table(logs: &[VerificationRow]) {
    heading(&format!("Verification logs ({})", logs.len()));
    for log in logs {
        println!(
            "  [{:>3}] {}  {:<10} {:>3}%  flags={} {}",
            log.id,
            log.created_at,
            log.verdict,
            log.confidence,
            log.flags.len(),
            log.uploaded_filename
        );
    }
}

/// One log with its suspicious-activity children.
pub fn log_card(log: &VerificationRow, activities: &[SuspiciousActivityRow]) {
    heading(&format!(
        "Log {}: {}   (confidence {}%)",
        log.id, log.verdict, log.confidence
    ));
    field("filename", &log.uploaded_filename);
    field("file hash", opt(&log.file_hash));
    field("created at", &log.created_at);
    field("ip address", opt(&log.client.ip_address));
    field("user agent", opt(&log.client.user_agent));
    match &log.matched_certificate_id {
        Some(id) => field("matched certificate", &id.to_string()),
        None => field("matched certificate", "-"),
    }
    println!("Extracted data");
    match serde_json::to_string_pretty(&log.extracted) {
        Ok(pretty) => {
            for line in pretty.lines() {
                println!("  {line}");
            }
        }
        Err(_) => println!("  (unreadable)"),
    }
    if log.flags.is_empty() {
        println!("Flags: none");
    } else {
        println!("Flags");
        for flag in &log.flags {
            println!("  - {flag}");
        }
    }
    if !activities.is_empty() {
        println!("Suspicious activity");
        for activity in activities {
            println!(
                "  [{:>3}] {:<28} {:<8} {}",
                activity.id,
                activity.activity_type,
                activity.severity.as_str(),
                activity.status
            );
        }
    }
}

pub fn activities_table(activities: &[SuspiciousActivityRow]) {
    heading(&format!("Pending suspicious activities ({})", activities.len()));
    for activity in activities {
        println!(
            "  [{:>3}] log {:<4} {:<28} {:<8} {}",
            activity.id,
            activity.verification_log_id,
            activity.activity_type,
            activity.severity.as_str(),
            activity.created_at
        );
    }
}

pub fn stats_card(stats: &VerificationStats) {
    heading("Verification statistics");
    field("total verifications", &stats.total_verifications.to_string());
    field("valid", &stats.valid_count.to_string());
    field("invalid", &stats.invalid_count.to_string());
    field("suspicious", &stats.suspicious_count.to_string());
    field("errors", &stats.error_count.to_string());
    field("institutions", &stats.total_institutions.to_string());
    field("active institutions", &stats.active_institutions.to_string());
}
