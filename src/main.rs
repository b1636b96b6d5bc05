use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use riskgate_core::{OutputFormat, RiskConfig};

const DEFAULT_CONFIG_FILE: &str = ".riskgate.toml";

#[derive(Parser)]
#[command(
    name = "riskgate",
    version,
    about = "Score recent commits for deployment risk",
    long_about = "Score recent commits for deployment risk.\n\n\
                   Each commit is scored from its conventional-commit type and the business\n\
                   criticality of the paths it touches. The batch average drives a deployment\n\
                   recommendation: standard, canary, or manual-approval.\n\n\
                   Examples:\n  \
                     riskgate init                      Create a .riskgate.toml template\n  \
                     riskgate                           Score the last 50 commits\n  \
                     riskgate --max-commits 10 --json   Full JSON report for the last 10\n  \
                     riskgate --repo ../svc --format markdown",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository to analyze (default: current directory)
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Path to risk configuration (default: <repo>/.riskgate.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of recent commits to analyze
    #[arg(
        long,
        default_value = "50",
        value_parser = clap::value_parser!(u32).range(1..=10_000)
    )]
    max_commits: u32,

    /// Emit the full report as JSON (same as --format json)
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Output format
    #[arg(
        long,
        default_value = "text",
        long_help = "Output format for the report.\n\n\
                       Formats:\n  \
                         text      One line per commit plus a summary (default)\n  \
                         json      Full report with snake_case keys\n  \
                         markdown  GitHub-flavored Markdown table"
    )]
    format: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a default .riskgate.toml configuration file
    #[command(long_about = "Create a default .riskgate.toml configuration file.\n\n\
        Writes example semantic weights and critical paths to edit for your repository.\n\
        Fails if .riskgate.toml already exists.")]
    Init {
        /// Directory to write the file into (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# riskgate configuration
#
# score = min(0.5 * semantic_weights[type] + 0.5 * max(business_criticality), 1.0)
# Types missing below weigh 0.1. Messages without "type:" use the "other" weight.

[semantic_weights]
feat = 0.6
fix = 0.4
perf = 0.5
refactor = 0.3
revert = 0.5
chore = 0.1
ci = 0.1
docs = 0.05
test = 0.1
other = 0.2

# Path prefixes, matched with starts_with against each changed file.
[critical_paths."services/payments"]
business_criticality = 1.0
compliance_domains = ["PCI-DSS"]

[critical_paths."services/auth-service"]
business_criticality = 0.9
compliance_domains = ["SOC2"]

[critical_paths."services/phi"]
business_criticality = 0.9
compliance_domains = ["HIPAA"]

[history]
# "cli" runs `git log`; "libgit2" reads history in-process.
backend = "cli"
timeout_secs = 30
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_init(dir: &Path) -> Result<()> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if path.exists() {
        miette::bail!("{} already exists", path.display());
    }
    std::fs::write(&path, DEFAULT_CONFIG)
        .into_diagnostic()
        .wrap_err(format!("writing {}", path.display()))?;
    println!("Created {} with default configuration", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Init { ref path }) => return run_init(path),
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "riskgate", &mut std::io::stdout());
            return Ok(());
        }
        None => {}
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.repo.join(DEFAULT_CONFIG_FILE));
    let config = RiskConfig::from_file(&config_path)
        .wrap_err_with(|| format!("loading risk configuration from {}", config_path.display()))?;
    tracing::debug!(
        semantic_weights = config.semantic_weights.len(),
        critical_paths = config.critical_paths.len(),
        "loaded risk configuration"
    );

    let commits =
        riskgate_history::read_recent_commits(&cli.repo, cli.max_commits, &config.history).await?;

    if commits.is_empty() {
        println!("No commits found. Initialize a git repo and create some commits.");
        return Ok(());
    }

    let report = riskgate_scoring::build_report(&commits, &config);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            print!("{}", report.to_markdown());
        }
        OutputFormat::Text => {
            print!("{report}");
        }
    }

    Ok(())
}
