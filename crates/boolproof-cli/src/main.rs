//! Boolproof CLI
//!
//! - `prove`: search for a law-by-law proof that an expression reduces to a
//!   terminal form (and whether it is a tautology)
//! - `deduce`: list every one-step rewrite, grouped by law
//! - `simplify`: show the constant/double-negation simplification steps
//! - `canon`: eliminate `->` and `<->`
//! - `expand`: grow a seed (default `1`) into a longer equivalent expression

use anyhow::{Context, Result};
use boolproof_dsl::{parse_expr, Expr};
use boolproof_laws::{canonicalize_steps, deduce, expand, simplify_to_fixpoint};
use boolproof_search::{create_oracle, ProofSearch, SearchConfig, SearchOutcome, SearchReport};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "boolproof")]
#[command(
    author,
    version,
    about = "Boolproof: step-by-step boolean algebra proofs"
)]
struct Cli {
    /// Log more (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a proof of EXPR.
    Prove {
        /// Expression, e.g. "(a or (a and b)) -> a"
        expr: String,
        #[command(flatten)]
        search: SearchArgs,
        /// Print the search report as JSON instead of formatted proofs
        #[arg(long)]
        json: bool,
    },

    /// List every expression one law application away from EXPR.
    Deduce { expr: String },

    /// Apply the simplifier to a fixpoint, one step per line.
    Simplify { expr: String },

    /// Eliminate implications and biconditionals.
    Canon { expr: String },

    /// Generate a tautology (or any equivalent of EXPR) by expanding it at
    /// random, one law per step.
    Expand {
        #[arg(default_value = "1")]
        expr: String,
        /// Number of expansion steps
        #[arg(short = 'n', long, default_value_t = 5)]
        iterations: usize,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// JSON search configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of levels (T)
    #[arg(short = 'T', long)]
    depth: Option<usize>,
    /// Oracle draws per node (B)
    #[arg(short = 'B', long)]
    branch: Option<usize>,
    /// Nodes kept per level (K)
    #[arg(short = 'K', long)]
    level_cap: Option<usize>,
    /// One draw per node and one node per level (B = K = 1)
    #[arg(long)]
    cot: bool,
    /// Stop at the first accepted proof
    #[arg(long)]
    early_stop: bool,
    /// Withdraw a law from the choices once it has been picked for a node
    #[arg(long)]
    remove_chosen_law: bool,
    /// Continue from the last checkpointed frontier
    #[arg(long)]
    resume: bool,
    /// Attempts per oracle call
    #[arg(long)]
    oracle_retries: Option<usize>,
    /// Checkpoint file (JSON lines)
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    /// Disable checkpointing
    #[arg(long, conflicts_with_all = ["checkpoint", "resume"])]
    no_checkpoint: bool,
    /// Oracle: greedy, random, anthropic, openai
    #[arg(long, default_value = "greedy")]
    oracle: String,
    /// Seed for the random oracle
    #[arg(long)]
    seed: Option<u64>,
    /// Model name for LLM oracles (default from ANTHROPIC_MODEL or OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,
}

impl SearchArgs {
    fn to_config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_json_file(path)?,
            None => SearchConfig::default(),
        };
        if self.cot {
            config = config.chain_of_thought();
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(branch) = self.branch {
            config.branch = branch;
        }
        if let Some(level_cap) = self.level_cap {
            config.level_cap = level_cap;
        }
        if let Some(retries) = self.oracle_retries {
            config.oracle_retries = retries;
        }
        config.early_stop |= self.early_stop;
        config.remove_chosen_law |= self.remove_chosen_law;
        config.resume |= self.resume;
        if let Some(path) = &self.checkpoint {
            config.checkpoint_path = Some(path.clone());
        }
        if self.no_checkpoint {
            config.checkpoint_path = None;
        }
        config.validate()?;
        Ok(config)
    }

    fn oracle_settings(&self) -> HashMap<String, String> {
        let mut settings = HashMap::new();
        if let Some(model) = &self.model {
            settings.insert("model".to_string(), model.clone());
        }
        if let Some(seed) = self.seed {
            settings.insert("seed".to_string(), seed.to_string());
        }
        settings
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn parse(text: &str) -> Result<Expr> {
    parse_expr(text).with_context(|| format!("cannot parse `{text}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Prove { expr, search, json } => cmd_prove(&expr, &search, json).await,
        Commands::Deduce { expr } => cmd_deduce(&expr),
        Commands::Simplify { expr } => cmd_simplify(&expr),
        Commands::Canon { expr } => cmd_canon(&expr),
        Commands::Expand {
            expr,
            iterations,
            seed,
        } => cmd_expand(&expr, iterations, seed),
    }
}

async fn cmd_prove(text: &str, args: &SearchArgs, json: bool) -> Result<()> {
    let input = parse(text)?;
    let config = args.to_config()?;
    let oracle = create_oracle(&args.oracle, &args.oracle_settings())?;
    let search = ProofSearch::new(config, oracle);
    tracing::info!(
        input = %input,
        oracle = %args.oracle,
        depth = search.config().depth,
        branch = search.config().branch,
        level_cap = search.config().level_cap,
        "starting proof search"
    );

    let report = search.run(&input).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SearchReport) {
    for (index, proof) in report.proofs.iter().enumerate() {
        if report.proofs.len() > 1 {
            println!("{}", format!("---------- PROOF #{} ----------", index + 1).bold());
        }
        println!("{}", proof.format_proof());
        println!();
    }

    match report.outcome() {
        SearchOutcome::Proved => eprintln!(
            "{} {} proof(s) in {} level(s)",
            "ok".green().bold(),
            report.proofs.len(),
            report.levels
        ),
        SearchOutcome::NoProofFound => eprintln!(
            "{} no proof found in {} level(s); {} branch(es) left in the frontier",
            "info:".yellow().bold(),
            report.levels,
            report.frontier.len()
        ),
    }
    if !report.failures.is_empty() {
        eprintln!(
            "{} {} branch(es) dropped after oracle failures",
            "warning:".yellow().bold(),
            report.failures.len()
        );
    }
    if !report.pruned.is_empty() {
        eprintln!(
            "{} {} branch(es) had no applicable law",
            "info:".yellow().bold(),
            report.pruned.len()
        );
    }
}

fn cmd_deduce(text: &str) -> Result<()> {
    let expr = parse(text)?;
    let deductions = deduce(&expr);
    if deductions.is_empty() {
        println!("{} {} is reduced", "ok".green().bold(), expr);
        return Ok(());
    }
    for (law, candidates) in &deductions {
        println!("{}", law.to_string().bold());
        for candidate in candidates {
            println!("  {} {}", "→".yellow(), candidate);
        }
    }
    Ok(())
}

fn cmd_simplify(text: &str) -> Result<()> {
    let expr = parse(text)?;
    println!("{expr}");
    for step in simplify_to_fixpoint(&expr) {
        println!("≡ {:<35} {}", step.expr.to_string(), step.law.to_string().dimmed());
    }
    Ok(())
}

fn cmd_canon(text: &str) -> Result<()> {
    let expr = parse(text)?;
    println!("{expr}");
    for (tree, law) in canonicalize_steps(&expr) {
        println!("≡ {:<35} {}", tree.to_string(), law.to_string().dimmed());
    }
    Ok(())
}

fn cmd_expand(text: &str, iterations: usize, seed: Option<u64>) -> Result<()> {
    let expr = parse(text)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    println!("{expr}");
    for step in expand(&expr, iterations, &mut rng) {
        println!(
            "≡ {:<35} {}",
            step.expr.to_string(),
            step.expansion.to_string().dimmed()
        );
    }
    Ok(())
}
