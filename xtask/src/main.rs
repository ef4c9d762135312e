use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::result::{ZipError, ZipResult};
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "server_wake_lambda";
const LAMBDA_BIN: &str = "scale_up_lambda";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the server wake workspace",
    long_about = "Checks the workspace and packages the scale-up Lambda\n\
                  as a provided.al2023 `bootstrap` zip."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci,
    /// Run the workspace tests
    Test,
    /// Build the scale-up Lambda and zip it as `bootstrap`
    Package {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory the zip is written to
        #[arg(long, env = "SERVER_WAKE_DIST_DIR", default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    exit(1)
}

/// Runs one labelled cargo invocation, exiting with cargo's code on failure.
fn cargo(label: &str, args: &[&str]) {
    eprintln!("\n=== {label} ===\n+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .unwrap_or_else(|error| fail(format!("could not launch cargo: {error}")));
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_lambda(target: &str, profile: BuildProfile, dist_dir: &Path) {
    ensure_rust_target_installed(target);

    let mut build_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BIN,
        "--target",
        target,
    ];
    build_args.extend(profile.as_cargo_flag());
    cargo("Build scale-up lambda binary", &build_args);

    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BIN);
    let zip_path = dist_dir.join(format!("{LAMBDA_BIN}.zip"));

    let packaged = fs::create_dir_all(dist_dir)
        .map_err(ZipError::from)
        .and_then(|()| bundle_bootstrap(&binary_path, &zip_path));
    match packaged {
        Ok(bytes) => eprintln!(
            "\nPackaged {} ({bytes} bytes as bootstrap)",
            zip_path.display()
        ),
        Err(error) => fail(format!(
            "could not package {} into {}: {error}",
            binary_path.display(),
            zip_path.display()
        )),
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        fail(format!(
            "rust target `{target}` is not installed; run `rustup target add {target}` first"
        ));
    }
}

/// Streams the binary into a zip as an executable `bootstrap` entry, the
/// layout the `provided.al2023` runtime expects. Returns the bytes copied.
fn bundle_bootstrap(binary_path: &Path, zip_path: &Path) -> ZipResult<u64> {
    let mut binary = fs::File::open(binary_path)?;
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);

    zip.start_file("bootstrap", options)?;
    let copied = io::copy(&mut binary, &mut zip)?;
    zip.finish()?;
    Ok(copied)
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    cargo("Check formatting", &["fmt", "--all", "--", "--check"]);
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    );
    run_tests();
}

fn run_tests() {
    for package in ["server_wake_core", LAMBDA_PACKAGE, "xtask"] {
        cargo(&format!("Test {package}"), &["test", "-p", package]);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => ci_check(),
        Commands::Test => run_tests(),
        Commands::Package {
            target,
            profile,
            dist_dir,
        } => package_lambda(&target, profile, &dist_dir),
    }
}
