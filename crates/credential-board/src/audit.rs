//! Offline audit of exported certificate records.
//!
//! Reads a CSV with the headers `student_name,institution_name,degree,year,fingerprint` and
//! recomputes each row's fingerprint.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::fingerprint::CertificateFields;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed certificate export: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVerdict {
    Valid,
    Tampered,
}

impl AuditVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            AuditVerdict::Valid => "valid",
            AuditVerdict::Tampered => "tampered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// 1-based data row, not counting the header.
    pub row: usize,
    pub fields: CertificateFields,
    pub stored_fingerprint: Option<String>,
    pub verdict: AuditVerdict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn valid(&self) -> usize {
        self.count(AuditVerdict::Valid)
    }

    pub fn tampered(&self) -> usize {
        self.count(AuditVerdict::Tampered)
    }

    pub fn is_clean(&self) -> bool {
        self.tampered() == 0
    }

    fn count(&self, verdict: AuditVerdict) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.verdict == verdict)
            .count()
    }
}

pub fn audit_path(path: impl AsRef<Path>) -> Result<AuditReport, AuditError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AuditError::Open {
        path: path.display().to_string(),
        source,
    })?;
    audit_reader(file)
}

pub fn audit_reader<R: Read>(reader: R) -> Result<AuditReport, AuditError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut entries = Vec::new();

    for (index, record) in csv_reader.deserialize::<CertificateRow>().enumerate() {
        let row = record?;
        let fields = CertificateFields {
            student_name: row.student_name,
            institution_name: row.institution_name,
            degree: row.degree,
            year: row.year,
        };
        let verdict = if fields.matches(row.fingerprint.as_deref()) {
            AuditVerdict::Valid
        } else {
            AuditVerdict::Tampered
        };

        entries.push(AuditEntry {
            row: index + 1,
            fields,
            stored_fingerprint: row.fingerprint,
            verdict,
        });
    }

    Ok(AuditReport { entries })
}

#[derive(Debug, Deserialize)]
struct CertificateRow {
    student_name: String,
    institution_name: String,
    degree: String,
    year: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fingerprint: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPORT: &str = "student_name,institution_name,degree,year,fingerprint\n\
Jane Doe,State Tech University,B.Sc. Computer Science,2023,468fc9a106a9f1737865b9c71c28530e43c8d1ab5b1020d4f14df36728736389\n\
Jane Doe,State Tech University,M.Sc. Computer Science,2023,468fc9a106a9f1737865b9c71c28530e43c8d1ab5b1020d4f14df36728736389\n\
John Roe,State Tech University,B.A. History,2021,\n";

    #[test]
    fn flags_rows_whose_fields_changed() {
        let report = audit_reader(Cursor::new(EXPORT)).expect("export parses");

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].verdict, AuditVerdict::Valid);
        assert_eq!(report.entries[1].verdict, AuditVerdict::Tampered);
        assert_eq!(report.entries[2].verdict, AuditVerdict::Tampered);
        assert_eq!(report.entries[2].stored_fingerprint, None);
        assert_eq!(report.valid(), 1);
        assert_eq!(report.tampered(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn keeps_cell_whitespace_verbatim() {
        let export = "student_name,institution_name,degree,year,fingerprint\n\
Jane Doe ,State Tech University,B.Sc. Computer Science,2023,468fc9a106a9f1737865b9c71c28530e43c8d1ab5b1020d4f14df36728736389\n";
        let report = audit_reader(Cursor::new(export)).expect("export parses");
        assert_eq!(report.entries[0].fields.student_name, "Jane Doe ");
        assert_eq!(report.entries[0].verdict, AuditVerdict::Tampered);
    }

    #[test]
    fn malformed_year_is_an_error() {
        let export = "student_name,institution_name,degree,year,fingerprint\nJane,Uni,BSc,soon,\n";
        assert!(matches!(
            audit_reader(Cursor::new(export)),
            Err(AuditError::Csv(_))
        ));
    }

    #[test]
    fn empty_export_is_clean() {
        let export = "student_name,institution_name,degree,year,fingerprint\n";
        let report = audit_reader(Cursor::new(export)).expect("header only parses");
        assert!(report.entries.is_empty());
        assert!(report.is_clean());
    }
}
