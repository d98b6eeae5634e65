//! Workspace automation tasks.

use std::process::{Command, ExitCode, Stdio};

use clap::{Parser, Subcommand};

/// Workspace automation tasks.
#[derive(Parser)]
#[command(name = "xtask")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format code and run clippy with auto-fix.
    Tidy,
    /// Run the test suite with default features (the `php` feature needs
    /// libphp and the shim at link time, so it is exercised separately).
    Test,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tidy => tidy(),
        Commands::Test => test(),
    }
}

fn run(label: &str, args: &[&str]) -> Result<(), ExitCode> {
    println!("{label}...");
    let status = Command::new("cargo")
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => {
            eprintln!("{label} failed");
            Err(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("failed to spawn cargo: {e}");
            Err(ExitCode::FAILURE)
        }
    }
}

fn tidy() -> ExitCode {
    let steps = [
        ("Formatting code", &["fmt", "--all"] as &[&str]),
        (
            "Running clippy with auto-fix",
            &[
                "clippy",
                "-q",
                "--fix",
                "--workspace",
                "--all-targets",
                "--allow-dirty",
            ],
        ),
    ];

    for (label, args) in steps {
        if let Err(code) = run(label, args) {
            return code;
        }
    }
    println!("\nTidy complete!");
    ExitCode::SUCCESS
}

fn test() -> ExitCode {
    match run("Running tests", &["test", "--workspace"]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
