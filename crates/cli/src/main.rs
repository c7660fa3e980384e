//! Codeswarm CLI
//!
//! Turns a project brief into a generated frontend/backend tree using a
//! coordinator agent and two code-writing agents.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use codeswarm_core::llm::{GenerationClient, GeminiClient};
use codeswarm_core::models::{Credentials, ModelConfig};
use codeswarm_core::swarm::{Coordinator, CoordinatorConfig, SwarmEvent};
use codeswarm_core::skills::TaskPlan;
use config::PersistedConfig;
use progress::ProgressPrinter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Brief used when none is given on the command line
const DEFAULT_BRIEF: &str = "
    Build a simple task management application.
    Users need to see a list of tasks, add new tasks via a form, and mark tasks as complete by clicking a checkbox.
    This requires a frontend UI and a backend API with a database to persist the tasks.
";

#[derive(Parser, Clone)]
#[command(author, version, about = "Codeswarm - brief-to-code agent pipeline")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,

    /// Config file (defaults to $CODESWARM_CONFIG or .codeswarm/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Plan and generate the whole project (default)
    Run {
        /// The project brief
        brief: Option<String>,
        /// Read the brief from a file
        #[arg(long, conflicts_with = "brief")]
        brief_file: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Only ask the coordinator for a plan and print it
    Plan {
        /// The project brief
        brief: Option<String>,
        #[arg(long, conflicts_with = "brief")]
        brief_file: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Write a default config file in the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Flags layered over the config file
#[derive(ClapArgs, Clone, Default)]
struct Overrides {
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Model name, e.g. gemini-pro-latest
    #[arg(short, long)]
    model: Option<String>,
    /// API base URL
    #[arg(long)]
    endpoint: Option<String>,
    /// Pause between tasks in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl From<Overrides> for PersistedConfig {
    fn from(o: Overrides) -> Self {
        PersistedConfig {
            model: o.model,
            endpoint: o.endpoint,
            timeout_secs: o.timeout_secs,
            output_dir: o.output,
            task_delay_ms: o.delay_ms,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Environment first, so GEMINI_API_KEY and RUST_LOG can come from .env
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match dispatch(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(args: Args) -> Result<ExitCode> {
    let config_path = args.config.unwrap_or_else(PersistedConfig::default_path);

    match args.command {
        Some(CliCommand::Init { force }) => init_project(&config_path, force).await,
        Some(CliCommand::Plan {
            brief,
            brief_file,
            overrides,
        }) => {
            let brief = read_brief(brief, brief_file).await?;
            let (model, coordinator) = layered_config(&config_path, overrides).await?;
            plan_only(&brief, model, coordinator).await
        }
        Some(CliCommand::Run {
            brief,
            brief_file,
            overrides,
        }) => {
            let brief = read_brief(brief, brief_file).await?;
            let (model, coordinator) = layered_config(&config_path, overrides).await?;
            run_swarm(&brief, model, coordinator).await
        }
        None => {
            let (model, coordinator) =
                layered_config(&config_path, Overrides::default()).await?;
            run_swarm(DEFAULT_BRIEF, model, coordinator).await
        }
    }
}

async fn read_brief(brief: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read brief file: {:?}", path));
    }
    Ok(brief.unwrap_or_else(|| DEFAULT_BRIEF.to_string()))
}

async fn layered_config(
    path: &Path,
    overrides: Overrides,
) -> Result<(ModelConfig, CoordinatorConfig)> {
    let mut layered = PersistedConfig::load(path).await?;
    layered.merge(overrides.into());
    tracing::debug!(config = ?layered, "Configuration resolved");
    Ok(layered.resolve())
}

/// Build the single client shared by every agent call
fn build_client(model: ModelConfig) -> Result<Option<Arc<dyn GenerationClient>>> {
    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Set GEMINI_API_KEY in the environment or in a .env file.");
            return Ok(None);
        }
    };
    let client: Arc<dyn GenerationClient> = Arc::new(GeminiClient::new(model, credentials)?);
    Ok(Some(client))
}

/// First 80 characters of the trimmed brief
fn brief_preview(brief: &str) -> String {
    brief.trim().chars().take(80).collect()
}

async fn run_swarm(
    brief: &str,
    model: ModelConfig,
    config: CoordinatorConfig,
) -> Result<ExitCode> {
    let Some(client) = build_client(model)? else {
        return Ok(ExitCode::FAILURE);
    };

    println!("--- 🚀 Starting AI Project Generation ---");
    println!("Project Brief: '{}...'", brief_preview(brief));

    let (tx, mut rx) = mpsc::channel::<SwarmEvent>(100);
    let printer = tokio::spawn(async move {
        let mut printer = ProgressPrinter::new();
        while let Some(event) = rx.recv().await {
            for line in printer.render(&event) {
                println!("{}", line);
            }
        }
    });

    let mut coordinator = Coordinator::new(config, client).with_event_channel(tx);
    let result = coordinator.run(brief).await;
    // Close the channel so the printer drains and exits
    drop(coordinator);
    let _ = printer.await;

    match result {
        Ok(result) if result.success => {
            tracing::info!(files = result.files().len(), "Run succeeded");
            Ok(ExitCode::SUCCESS)
        }
        Ok(result) => {
            tracing::warn!(failed = result.failed(), "Some tasks failed");
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_plan(plan: &TaskPlan) {
    println!("\n[ Frontend Tasks ]");
    for (i, task) in plan.frontend_tasks.iter().enumerate() {
        println!("  {}. {}", i + 1, task);
    }
    println!("\n[ Backend Tasks ]");
    for (i, task) in plan.backend_tasks.iter().enumerate() {
        println!("  {}. {}", i + 1, task);
    }
}

async fn plan_only(
    brief: &str,
    model: ModelConfig,
    config: CoordinatorConfig,
) -> Result<ExitCode> {
    let Some(client) = build_client(model)? else {
        return Ok(ExitCode::FAILURE);
    };

    println!("Project Brief: '{}...'", brief_preview(brief));
    let mut coordinator = Coordinator::new(config, client);
    match coordinator.plan(brief).await {
        Ok(plan) => {
            println!("✅ Plan received and parsed successfully.");
            print_plan(&plan);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            // The raw response, if any, is already in the warn log
            eprintln!("{}", progress::plan_failure_line(e.kind(), &e.to_string()));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Write `.codeswarm/config.json` with every default spelled out
async fn init_project(config_path: &Path, force: bool) -> Result<ExitCode> {
    if config_path.exists() && !force {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    PersistedConfig::defaults().save(config_path).await?;

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        let gitignore = dir.join(".gitignore");
        if !gitignore.exists() {
            tokio::fs::write(&gitignore, ".env\n")
                .await
                .with_context(|| format!("Failed to write {:?}", gitignore))?;
        }
    }

    println!("✅ Wrote {}", config_path.display());
    println!("   Put GEMINI_API_KEY in a .env file next to where you run codeswarm.");
    Ok(ExitCode::SUCCESS)
}
