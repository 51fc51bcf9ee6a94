use crate::demo::{run_demo, DemoArgs};
use crate::reports::{run_audit, run_fingerprint, AuditArgs, FingerprintArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credential_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credential Board",
    about = "Run the job board and degree verification service, or work with certificate fingerprints offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute, or check, the fingerprint of a certificate record
    Fingerprint(FingerprintArgs),
    /// Recompute fingerprints for every row of a CSV certificate export
    Audit(AuditArgs),
    /// Walk through registration, hiring, and verification against an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fingerprint(args) => {
            run_fingerprint(args);
            Ok(())
        }
        Command::Audit(args) => run_audit(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["credential-board"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn fingerprint_arguments_parse() {
        let cli = Cli::try_parse_from([
            "credential-board",
            "fingerprint",
            "--student-name",
            "Jane Doe",
            "--institution",
            "State Tech University",
            "--degree",
            "B.Sc. Computer Science",
            "--year",
            "2023",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Fingerprint(args)) => {
                assert_eq!(args.student_name, "Jane Doe");
                assert_eq!(args.year, 2023);
                assert!(args.verify.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["credential-board", "serve", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
