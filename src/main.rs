use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repodoc::cli::commands;
use repodoc::cli::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(
    version,
    about = "Generate per-file and project documentation for a repository with an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file used instead of <repo>/.repodoc.toml
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Document a repository
    Generate {
        #[arg(default_value = ".", help = "Repository root")]
        repo: PathBuf,
        #[arg(long, short, help = "Output directory (default: sibling <name>-docs-<id>)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Project name used in the documents")]
        name: Option<String>,
        #[arg(long, help = "LLM provider (openrouter, openai)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, env = "REPODOC_API_KEY", hide_env_values = true, help = "API key")]
        api_key: Option<String>,
        #[arg(long, short, help = "Simultaneous LLM calls")]
        workers: Option<usize>,
        #[arg(long, help = "Also emit a Docusaurus site")]
        site: bool,
        #[arg(long, help = "Site directory (default: <output>-docusaurus)")]
        site_dir: Option<PathBuf>,
        #[arg(long, help = "Keep hidden and _-prefixed docs in the site")]
        show_hidden: bool,
        #[arg(long, help = "Skip the architecture narrative in dependencies.md")]
        no_narrative: bool,
    },

    /// Show what would be documented, without calling the LLM
    Scan {
        #[arg(default_value = ".", help = "Repository root")]
        repo: PathBuf,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// List generated documentation sets
    List {
        #[arg(help = "Directories to search (default: current directory)")]
        roots: Vec<PathBuf>,
        #[arg(long, short, help = "Only sets for this project")]
        project: Option<String>,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show {
        #[arg(default_value = ".")]
        repo: PathBuf,
        #[arg(short = 'f', long, default_value = "toml", help = "Output format: toml, json")]
        format: String,
    },
    /// Show configuration file paths
    Path {
        #[arg(default_value = ".")]
        repo: PathBuf,
    },
    /// Write a default configuration file
    Init {
        #[arg(default_value = ".")]
        repo: PathBuf,
        #[arg(long, short, help = "Initialize the global config")]
        global: bool,
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepodoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            repo,
            output,
            name,
            provider,
            model,
            api_key,
            workers,
            site,
            site_dir,
            show_hidden,
            no_narrative,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(GenerateOptions {
                repo,
                config: cli.config,
                output,
                project_name: name,
                provider,
                model,
                api_key,
                workers,
                site,
                site_dir,
                show_hidden,
                no_narrative,
                quiet: cli.quiet,
            }))?;
        }
        Commands::Scan { repo, format } => {
            commands::scan::run(&repo, cli.config, &format)?;
        }
        Commands::List {
            roots,
            project,
            format,
        } => {
            commands::list::run(roots, project.as_deref(), &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { repo, format } => {
                commands::config::show(&repo, cli.config.as_deref(), &format)?;
            }
            ConfigAction::Path { repo } => {
                commands::config::path(&repo)?;
            }
            ConfigAction::Init {
                repo,
                global,
                force,
            } => {
                commands::config::init(&repo, global, force)?;
            }
        },
    }

    Ok(())
}
