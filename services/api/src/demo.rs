use chrono::Duration;
use clap::Args;
use credential_board::auth::{AuthContext, Role, SessionStore};
use credential_board::board::{
    ApplicationDraft, Board, BoardError, CertificateCheck, DecisionRequest, InMemoryBoardStore,
    InMemoryResumeStore, JobDraft, RegistrationRequest, VerificationDraft, VerificationStatus,
};
use credential_board::error::AppError;
use std::sync::Arc;

type DemoBoard = Board<InMemoryBoardStore, InMemoryResumeStore>;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Student named on the certificate the employer asks about
    #[arg(long, default_value = "Jane Doe")]
    pub(crate) student_name: String,
    /// Degree claimed on the certificate
    #[arg(long, default_value = "B.Sc. Computer Science")]
    pub(crate) degree: String,
    /// Graduation year claimed on the certificate
    #[arg(long, default_value_t = 2023)]
    pub(crate) year: i32,
    /// Have the university reject the request instead of verifying it
    #[arg(long)]
    pub(crate) reject: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let board = Board::new(
        Arc::new(InMemoryBoardStore::default()),
        Arc::new(InMemoryResumeStore::default()),
        SessionStore::new(Duration::minutes(15)),
        1024 * 1024,
    );

    if let Err(err) = walkthrough(&board, &args) {
        println!("  Demo stopped: {err}");
    }
    Ok(())
}

fn walkthrough(board: &DemoBoard, args: &DemoArgs) -> Result<(), BoardError> {
    println!("Credential board demo (in-memory store)");

    let university = enroll(
        board,
        Role::University,
        "registrar@statetech.edu",
        "State Tech University",
    )?;
    let employer = enroll(board, Role::Employer, "talent@acme.test", "Acme Corp")?;
    let applicant = enroll(board, Role::Applicant, "jane@example.test", &args.student_name)?;

    println!("\nHiring");
    let job = board.employer.post_job(
        &employer,
        JobDraft {
            title: "Data Engineer".to_string(),
            description: "Own the reporting pipeline".to_string(),
        },
    )?;
    println!("- Posted job {} \"{}\"", job.id, job.title);

    let resume = board.applicant.upload_resume(
        &applicant,
        "resume.pdf",
        b"%PDF-1.4 demo resume".to_vec(),
    )?;
    println!(
        "- Applicant stored resume at {} ({} bytes, {})",
        resume.path, resume.size_bytes, resume.content_type
    );

    let application = board.applicant.apply(
        &applicant,
        job.id,
        ApplicationDraft {
            cover_letter: Some("Five years of pipeline work.".to_string()),
        },
    )?;
    println!("- Application {} filed for job {}", application.id, job.id);
    let received = board.employer.applications_for_job(&employer, job.id)?;
    println!("- Employer sees {} application(s)", received.len());

    println!("\nVerification");
    let request = board.employer.request_verification(
        &employer,
        VerificationDraft {
            university_id: university.user_id,
            student_name: args.student_name.clone(),
            degree: args.degree.clone(),
            year: args.year,
        },
    )?;
    println!(
        "- Request {} sent to {} -> {}",
        request.id,
        request.issuing_institution_name,
        request.status()
    );

    let decision = if args.reject {
        DecisionRequest {
            status: VerificationStatus::Rejected,
            reason: Some("No matching graduate on record".to_string()),
        }
    } else {
        DecisionRequest {
            status: VerificationStatus::Verified,
            reason: None,
        }
    };
    let decided = board.university.decide(&university, request.id, decision)?;
    println!("- University decision: {}", decided.status());

    let Some(fingerprint) = decided.fingerprint() else {
        if let Some(reason) = decided.rejection_reason() {
            println!("  Reason: {reason}");
        }
        println!("  No certificate issued");
        return Ok(());
    };
    println!("  Fingerprint: {fingerprint}");

    let certificate = board.certificates.by_fingerprint(fingerprint)?;
    match serde_json::to_string_pretty(&certificate) {
        Ok(json) => println!("  Public certificate:\n{json}"),
        Err(err) => println!("  Public certificate unavailable: {err}"),
    }

    let forged = CertificateCheck {
        student_name: certificate.student_name.clone(),
        institution_name: certificate.institution_name.clone(),
        degree: format!("{} (Honours)", certificate.degree),
        year: certificate.year,
        fingerprint: Some(certificate.fingerprint.clone()),
    };
    println!(
        "- Check with an embellished degree: {}",
        if board.certificates.check(&forged).valid {
            "valid"
        } else {
            "invalid"
        }
    );

    Ok(())
}

fn enroll(
    board: &DemoBoard,
    role: Role,
    email: &str,
    name: &str,
) -> Result<AuthContext, BoardError> {
    let grant = board.accounts.register(RegistrationRequest {
        email: email.to_string(),
        password: "demo-password".to_string(),
        role,
        name: name.to_string(),
    })?;
    println!("- Registered {} {} as user {}", role, grant.name, grant.user_id);
    board.accounts.resolve(&grant.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(reject: bool) -> DemoArgs {
        DemoArgs {
            student_name: "Jane Doe".to_string(),
            degree: "B.Sc. Computer Science".to_string(),
            year: 2023,
            reject,
        }
    }

    fn board() -> DemoBoard {
        Board::new(
            Arc::new(InMemoryBoardStore::default()),
            Arc::new(InMemoryResumeStore::default()),
            SessionStore::new(Duration::minutes(15)),
            1024 * 1024,
        )
    }

    #[test]
    fn walkthrough_issues_a_certificate() {
        let board = board();
        walkthrough(&board, &args(false)).expect("demo completes");

        let certificate = board
            .certificates
            .by_fingerprint("468fc9a106a9f1737865b9c71c28530e43c8d1ab5b1020d4f14df36728736389")
            .expect("certificate issued");
        assert!(certificate.integrity_valid);
    }

    #[test]
    fn walkthrough_handles_rejection() {
        walkthrough(&board(), &args(true)).expect("demo completes");
    }

    #[test]
    fn invalid_year_stops_the_demo_without_failing() {
        let mut args = args(false);
        args.year = 1800;
        assert!(run_demo(args).is_ok());
    }
}
