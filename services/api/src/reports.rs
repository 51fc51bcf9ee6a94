use clap::Args;
use credential_board::audit::{audit_path, AuditReport};
use credential_board::error::AppError;
use credential_board::fingerprint::CertificateFields;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct FingerprintArgs {
    /// Student name exactly as recorded on the certificate
    #[arg(long)]
    pub(crate) student_name: String,
    /// Issuing institution name
    #[arg(long)]
    pub(crate) institution: String,
    /// Degree title
    #[arg(long)]
    pub(crate) degree: String,
    /// Graduation year
    #[arg(long)]
    pub(crate) year: i32,
    /// Fingerprint to check the fields against instead of just printing one
    #[arg(long)]
    pub(crate) verify: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// CSV export with student_name,institution_name,degree,year,fingerprint columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Emit the full report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_fingerprint(args: FingerprintArgs) {
    print!("{}", render_fingerprint(&args));
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let report = audit_path(&args.csv)?;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Audit report unavailable as JSON: {err}"),
        }
    } else {
        print!("{}", render_audit(&report));
    }
    Ok(())
}

fn render_fingerprint(args: &FingerprintArgs) -> String {
    let fields = CertificateFields {
        student_name: args.student_name.clone(),
        institution_name: args.institution.clone(),
        degree: args.degree.clone(),
        year: args.year,
    };

    match args.verify.as_deref() {
        None => format!("{}\n", fields.fingerprint()),
        Some(stored) if fields.matches(Some(stored)) => {
            "match: fingerprint agrees with the supplied fields\n".to_string()
        }
        Some(_) => format!(
            "mismatch: fields fingerprint to {}\n",
            fields.fingerprint()
        ),
    }
}

fn render_audit(report: &AuditReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Certificate audit ({} rows)", report.entries.len());
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "- row {:>3} [{}] {} | {} | {} | {}",
            entry.row,
            entry.verdict.label(),
            entry.fields.student_name,
            entry.fields.institution_name,
            entry.fields.degree,
            entry.fields.year
        );
    }
    let _ = writeln!(
        out,
        "Totals: {} valid, {} tampered",
        report.valid(),
        report.tampered()
    );
    out
}
