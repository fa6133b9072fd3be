//! Top-level CLI parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::error::TrialCheckError;
use crate::sources::trial_library::TrialLibrary;
use crate::sources::trial_search::{
    FixtureTrialSearchClient, HttpTrialSearchClient, TrialSearchClient,
};
use crate::suite::{self, Case, Expectations, SuiteMode};
use crate::utils::zipcode;

#[derive(Parser, Debug)]
#[command(
    name = "trialcheck",
    about = "Contract and schema checks for a ZIP/radius clinical-trial search endpoint",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON instead of Markdown
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// How the search origins of a run are chosen.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ZipArgs {
    /// Number of ZIP codes to sample from the built-in pool
    #[arg(long = "zip-count", default_value_t = zipcode::DEFAULT_SAMPLE_COUNT)]
    pub zip_count: usize,

    /// Seed for reproducible ZIP sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use these ZIP codes instead of sampling (repeatable)
    #[arg(long = "zip", value_name = "ZIP")]
    pub zips: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the contract suite
    #[command(after_help = "\
EXAMPLES:
  trialcheck run
  trialcheck run --config properties.toml --zip 60616 --zip 98101
  trialcheck run --fixture --seed 7 --json
  trialcheck run --fixture --library trials.sqlite")]
    Run {
        /// TOML properties file with `[API_URL] endpoint`
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        #[command(flatten)]
        zips: ZipArgs,

        /// Answer from the canned Chicago dataset instead of the live service
        #[arg(long)]
        fixture: bool,

        /// SQLite file whose `trial_search_results` rows replace the canned dataset
        #[arg(long, value_name = "PATH", requires = "fixture")]
        library: Option<PathBuf>,
    },
    /// Print sampled ZIP codes
    Zips {
        /// Number of ZIP codes
        #[arg(short, long, default_value_t = zipcode::DEFAULT_SAMPLE_COUNT)]
        count: usize,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the cases a run would execute
    Cases {
        #[command(flatten)]
        zips: ZipArgs,

        /// Plan the fixture variant (exact Chicago match)
        #[arg(long)]
        fixture: bool,
    },
    /// Create a SQLite mock-data file holding the canned Chicago trials
    Seed {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Show version and build information
    Version,
}

/// Rendered command output plus whether the command considers itself successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

fn version_output() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("TRIALCHECK_BUILD_GIT_SHA").unwrap_or("unknown");
    let build = option_env!("TRIALCHECK_BUILD_DATE").unwrap_or("unknown");
    format!("trialcheck {version} (git {git}, build {build})")
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String, TrialCheckError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn sample_zips(count: usize, seed: Option<u64>) -> Result<Vec<String>, TrialCheckError> {
    match seed {
        Some(seed) => zipcode::sample_seeded(count, seed),
        None => zipcode::sample(count),
    }
}

fn resolve_zips(args: &ZipArgs) -> Result<Vec<String>, TrialCheckError> {
    if args.zips.is_empty() {
        let zips = sample_zips(args.zip_count, args.seed)?;
        debug!(?zips, "sampled ZIP codes");
        return Ok(zips);
    }
    for zip in args.zips.iter().filter(|z| !zipcode::looks_like_zip5(z)) {
        warn!(zip = %zip, "not a five-digit ZIP code, sending as given");
    }
    Ok(args.zips.clone())
}

fn suite_mode(fixture: bool) -> SuiteMode {
    if fixture {
        SuiteMode::Fixture
    } else {
        SuiteMode::Live
    }
}

fn fixture_client(library: Option<&PathBuf>) -> Result<FixtureTrialSearchClient, TrialCheckError> {
    match library {
        Some(path) => {
            let rows = TrialLibrary::new(path).fetch_trial_rows()?;
            info!(path = %path.display(), rows = rows.len(), "loaded trial library");
            Ok(FixtureTrialSearchClient::from_records(rows))
        }
        None => FixtureTrialSearchClient::chicago(),
    }
}

fn cases_markdown(cases: &[Case]) -> String {
    let mut out = String::new();
    out.push_str("| # | Case | Query | Expected status |\n");
    out.push_str("|---|------|-------|-----------------|\n");
    for (i, case) in cases.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            case.kind,
            case.query,
            case.query.expected_status()
        ));
    }
    out.push_str(&format!("\n{} cases\n", cases.len()));
    out
}

async fn run_suite(
    config: Option<PathBuf>,
    zips: &ZipArgs,
    fixture: bool,
    library: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<CommandOutput> {
    let zips = resolve_zips(zips)?;
    let mode = suite_mode(fixture);
    let cases = suite::plan(&zips, mode);
    let expectations = Expectations::bundled()?;

    let client: Box<dyn TrialSearchClient> = if fixture {
        Box::new(fixture_client(library.as_ref())?)
    } else {
        let config = ServiceConfig::resolve(config.as_deref())?;
        Box::new(HttpTrialSearchClient::new(&config)?)
    };
    info!(target_url = %client.describe(), cases = cases.len(), "running suite");

    let report = suite::run(client.as_ref(), &cases, &expectations).await;
    let text = if json {
        to_pretty(&report)?
    } else {
        report.to_markdown()
    };
    Ok(CommandOutput {
        text,
        success: report.all_passed(),
    })
}

/// Executes a parsed command line.
///
/// # Errors
///
/// Returns an error when arguments are invalid, configuration cannot be
/// resolved, or a local file cannot be read or written. Failing suite cases
/// are not errors: they are reported through [`CommandOutput::success`].
pub async fn run(cli: Cli) -> anyhow::Result<CommandOutput> {
    match cli.command {
        Commands::Run {
            config,
            zips,
            fixture,
            library,
        } => run_suite(config, &zips, fixture, library, cli.json).await,
        Commands::Zips { count, seed } => {
            let zips = sample_zips(count, seed)?;
            if cli.json {
                Ok(CommandOutput::ok(to_pretty(&zips)?))
            } else {
                Ok(CommandOutput::ok(zips.join("\n")))
            }
        }
        Commands::Cases { zips, fixture } => {
            let cases = suite::plan(&resolve_zips(&zips)?, suite_mode(fixture));
            if cli.json {
                Ok(CommandOutput::ok(to_pretty(&cases)?))
            } else {
                Ok(CommandOutput::ok(cases_markdown(&cases)))
            }
        }
        Commands::Seed { path } => {
            TrialLibrary::new(&path).seed_chicago()?;
            Ok(CommandOutput::ok(format!(
                "Seeded trial_search_results in {}",
                path.display()
            )))
        }
        Commands::Version => Ok(CommandOutput::ok(version_output())),
    }
}
