use anyhow::{Context, Result};
use clap::Parser;
use sanity_core::{
    load_rules, scan_and_write, ExplicitFiles, FileSource, RepositoryFiles, RuleCatalog, CONFIG_FILE_NAME,
    CONFIG_PATH_ENV,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Command line entry
#[derive(Parser, Debug)]
#[command(
    name = "git-sanity",
    version,
    about = "Advisory style and hygiene checks for files in a git working tree",
    after_help = "Rules are read from git-sanity-checker.cfg next to the executable, \
                  or from the file named by GIT_SANITY_CONFIG."
)]
struct Cli {
    /// Files, directories or glob patterns. Without any, the staged, unstaged
    /// and untracked files of the enclosing git repository are checked.
    paths: Vec<String>,
}

fn main() -> ExitCode {
    // Logs go to stderr (RUST_LOG, default warn); stdout carries diagnostics only
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = config_path()?;
    let rules = load_rules(&config_path, &RuleCatalog::builtin())?;
    info!(config = %config_path.display(), rules = rules.len(), "rules loaded");

    let files = if cli.paths.is_empty() {
        RepositoryFiles::from_current_dir()?.list_files()?
    } else {
        ExplicitFiles::new(cli.paths.iter().cloned()).list_files()?
    };
    if files.is_empty() {
        info!("no files to check");
        return Ok(());
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let stats = scan_and_write(&rules, &files, &mut out).context("check aborted")?;
    out.flush()?;

    // Diagnostics are advisory: they never change the exit status
    info!(
        files_scanned = stats.files_scanned,
        files_loaded = stats.files_loaded,
        diagnostics = stats.diagnostics,
        "check finished"
    );
    Ok(())
}

/// `GIT_SANITY_CONFIG` if set, else the config file beside the executable.
fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let dir = exe.parent().context("executable has no parent directory")?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
