//! guidekit - match guidance skills to intents and format edited files.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use guidekit::render::{render_catalog, render_selection};
use guidekit::{handle_post_edit, select_skills, Catalog, DispatchOutcome, FormatDispatch};
use guidekit_core::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "guidekit", about = "Skill matching and post-edit formatting", version)]
struct Cli {
    /// Config file (layered over .guidekit/config)
    #[arg(long, global = true, env = "GUIDEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Workspace root (defaults to the git root or current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which skills match an intent
    Match {
        /// Free-text description of the task
        #[arg(required = true, num_args = 1..)]
        intent: Vec<String>,

        /// Print the selection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the bodies of the skills matching an intent
    Inject {
        #[arg(required = true, num_args = 1..)]
        intent: Vec<String>,
    },

    /// List the skill catalog
    List {
        /// Render as an <available_skills> XML block
        #[arg(long)]
        xml: bool,
    },

    /// Run the configured formatter on edited files
    Format {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Handle a post-edit hook payload from stdin
    Hook,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let workspace_root = match cli.workspace {
        Some(path) => path,
        None => find_workspace_root().wrap_err("failed to determine workspace root")?,
    };
    let config = Config::load(&workspace_root, cli.config.as_deref())
        .wrap_err("failed to load configuration")?;

    match cli.command {
        Command::Match { intent, json } => {
            let catalog = load_catalog(&config, &workspace_root)?;
            show_match(&catalog, &config, &intent.join(" "), json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Inject { intent } => {
            let catalog = load_catalog(&config, &workspace_root)?;
            let selection = select_skills(&intent.join(" "), &catalog, config.skills_max_selected);
            report_hint_errors(&selection.errors);
            let rendered =
                render_selection(&selection.descriptors(&catalog), config.skills_max_body_chars);
            if !rendered.is_empty() {
                println!("{rendered}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::List { xml } => {
            let catalog = load_catalog(&config, &workspace_root)?;
            show_list(&catalog, xml);
            Ok(ExitCode::SUCCESS)
        }
        Command::Format { paths } => {
            let dispatch = FormatDispatch::from_config(&config, None);
            for path in &paths {
                let outcome = dispatch
                    .on_file_edited(path)
                    .wrap_err_with(|| format!("formatting {}", path.display()))?;
                print_outcome(path, &outcome);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Hook => run_hook(&config, &workspace_root),
    }
}

fn load_catalog(config: &Config, workspace_root: &Path) -> Result<Catalog> {
    let catalog = Catalog::load(config, workspace_root).wrap_err("invalid skill catalog")?;
    for skipped in catalog.skipped() {
        eprintln!(
            "warning: skipped skill '{}' ({}): {}",
            skipped.name,
            skipped.path.display(),
            skipped.error
        );
    }
    Ok(catalog)
}

fn show_match(catalog: &Catalog, config: &Config, intent: &str, json: bool) -> Result<()> {
    let selection = select_skills(intent, catalog, config.skills_max_selected);
    if json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
        return Ok(());
    }

    report_hint_errors(&selection.errors);
    if selection.is_empty() {
        println!("No matching skills.");
        return Ok(());
    }
    for skill in &selection.skills {
        println!("{:<24}  {}", skill.name, skill.reason);
    }
    Ok(())
}

fn report_hint_errors(errors: &[String]) {
    for e in errors {
        eprintln!("warning: {e}");
    }
}

fn show_list(catalog: &Catalog, xml: bool) {
    if xml {
        println!("{}", render_catalog(catalog.skills()));
        return;
    }
    if catalog.is_empty() {
        println!("No skills found.");
        return;
    }
    println!("{:<24}  {:<8}  DESCRIPTION", "NAME", "LOCATION");
    for skill in catalog.skills() {
        println!(
            "{:<24}  {:<8}  {}",
            skill.name,
            skill.location.as_str(),
            skill.description
        );
    }
    println!();
    println!("{} skill(s)", catalog.len());
}

fn print_outcome(path: &Path, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Formatted {
            command,
            duration_ms,
        } => println!("{}: {command} ({duration_ms}ms)", path.display()),
        DispatchOutcome::NoRule => println!("{}: no formatter", path.display()),
        DispatchOutcome::Disabled => println!("{}: formatting disabled", path.display()),
    }
}

/// Format the file named by the hook payload on stdin.
fn run_hook(config: &Config, workspace_root: &Path) -> Result<ExitCode> {
    let outcome = handle_post_edit(std::io::stdin().lock(), workspace_root, |dir| {
        FormatDispatch::from_config(config, Some(dir))
    })?;
    if let Some(message) = outcome.diagnostics() {
        eprintln!("{message}");
    }
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Find the workspace root (git root or cwd).
fn find_workspace_root() -> std::io::Result<PathBuf> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let path = String::from_utf8_lossy(&out.stdout).trim().to_string();
            Ok(PathBuf::from(path))
        }
        _ => std::env::current_dir(),
    }
}
