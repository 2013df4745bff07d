//! Demonstration registry: a handful of Jharkhand institutions and the
//! certificates they issued. Handy for trying the verifier without a real
//! registry import.

use credcheck_store::{NewCertificate, NewInstitution, Store, StoreError};

struct SeedCertificate {
    certificate_number: &'static str,
    student_name: &'static str,
    roll_number: &'static str,
    course_name: &'static str,
    degree_type: &'static str,
    passing_year: i32,
    grade: &'static str,
    percentage: f64,
    issue_date: &'static str,
    /// Index into the institution seed list.
    institution: usize,
}

const INSTITUTIONS: &[(&str, &str, &str, i32)] = &[
    ("Ranchi University", "RU001", "University", 1960),
    ("Birla Institute of Technology", "BIT001", "Institute", 1955),
    ("Central University of Jharkhand", "CUJ001", "University", 2009),
    ("St. Xaviers College", "SXC001", "College", 1944),
    ("Government Polytechnic Ranchi", "GPR001", "Polytechnic", 1960),
];

const CERTIFICATES: &[SeedCertificate] = &[
    SeedCertificate {
        certificate_number: "RU/2023/BSC/001234",
        student_name: "Rahul Kumar Singh",
        roll_number: "RU23BSC001234",
        course_name: "Bachelor of Science in Computer Science",
        degree_type: "Bachelor",
        passing_year: 2023,
        grade: "A",
        percentage: 85.5,
        issue_date: "2023-06-15",
        institution: 0,
    },
    SeedCertificate {
        certificate_number: "RU/2022/BA/005678",
        student_name: "Priya Kumari",
        roll_number: "RU22BA005678",
        course_name: "Bachelor of Arts in English",
        degree_type: "Bachelor",
        passing_year: 2022,
        grade: "B",
        percentage: 75.2,
        issue_date: "2022-07-20",
        institution: 0,
    },
    SeedCertificate {
        certificate_number: "BIT/2023/BTECH/098765",
        student_name: "Ankit Sharma",
        roll_number: "BIT23BTECH098765",
        course_name: "Bachelor of Technology in Computer Science and Engineering",
        degree_type: "Bachelor",
        passing_year: 2023,
        grade: "A+",
        percentage: 92.3,
        issue_date: "2023-05-30",
        institution: 1,
    },
    SeedCertificate {
        certificate_number: "BIT/2023/MTECH/012345",
        student_name: "Deepika Verma",
        roll_number: "BIT23MTECH012345",
        course_name: "Master of Technology in Information Technology",
        degree_type: "Master",
        passing_year: 2023,
        grade: "A",
        percentage: 88.7,
        issue_date: "2023-06-10",
        institution: 1,
    },
    SeedCertificate {
        certificate_number: "CUJ/2023/MA/567890",
        student_name: "Ravi Kumar",
        roll_number: "CUJ23MA567890",
        course_name: "Master of Arts in Economics",
        degree_type: "Master",
        passing_year: 2023,
        grade: "B+",
        percentage: 78.9,
        issue_date: "2023-07-05",
        institution: 2,
    },
    SeedCertificate {
        certificate_number: "SXC/2023/BCOM/111222",
        student_name: "Sunita Devi",
        roll_number: "SXC23BCOM111222",
        course_name: "Bachelor of Commerce",
        degree_type: "Bachelor",
        passing_year: 2023,
        grade: "A",
        percentage: 82.1,
        issue_date: "2023-06-25",
        institution: 3,
    },
    SeedCertificate {
        certificate_number: "GPR/2023/DIP/333444",
        student_name: "Amit Kumar",
        roll_number: "GPR23DIP333444",
        course_name: "Diploma in Mechanical Engineering",
        degree_type: "Diploma",
        passing_year: 2023,
        grade: "B",
        percentage: 72.5,
        issue_date: "2023-08-01",
        institution: 4,
    },
];

/// Load the demonstration data. Returns (institutions, certificates) counts.
pub fn load(store: &dyn Store) -> Result<(usize, usize), StoreError> {
    let mut institution_ids = Vec::with_capacity(INSTITUTIONS.len());
    for (name, code, kind, established_year) in INSTITUTIONS {
        let id = store.add_institution(NewInstitution {
            name: (*name).to_string(),
            code: (*code).to_string(),
            kind: (*kind).to_string(),
            address: Some("Ranchi, Jharkhand".to_string()),
            contact_email: None,
            phone: None,
            established_year: Some(*established_year),
        })?;
        institution_ids.push(id);
    }

    for cert in CERTIFICATES {
        store.add_certificate(NewCertificate {
            certificate_number: cert.certificate_number.to_string(),
            student_name: cert.student_name.to_string(),
            roll_number: Some(cert.roll_number.to_string()),
            course_name: cert.course_name.to_string(),
            degree_type: cert.degree_type.to_string(),
            passing_year: cert.passing_year,
            grade: Some(cert.grade.to_string()),
            percentage: Some(cert.percentage),
            issue_date: Some(cert.issue_date.to_string()),
            institution_id: institution_ids[cert.institution],
        })?;
    }

    Ok((INSTITUTIONS.len(), CERTIFICATES.len()))
}
