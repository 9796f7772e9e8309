use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use creative_pulse::config::AnalysisConfig;
use creative_pulse::{analyze, format_float, format_percent, format_score, AnalysisInput};

#[derive(Parser)]
#[command(name = "creative-pulse", about = "Creative portfolio signal analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/analysis.toml")]
    path: PathBuf,
}

fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::InitConfig(args) => run_init_config(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let payload = read_input(args.input.as_deref())?;
    let input: AnalysisInput = serde_json::from_str(&payload)
        .map_err(|err| format!("failed to parse input: {}", err))?;

    let (config, config_path) = AnalysisConfig::load(args.config)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "loaded analysis config");
    }

    let report = analyze(&input, &config).map_err(|err| err.to_string())?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", rendered);
        return Ok(());
    }

    let counts = report.category_counts;
    println!(
        "Portfolio: {} assets | organic-first {} | paid-first {} | dual-use {} | moment-only {}",
        report.classified.len(),
        counts.organic_first,
        counts.paid_first,
        counts.dual_use,
        counts.moment_only
    );
    println!(
        "Balance: organic momentum {} ({}) | paid dependency {} ({}) | stability {} ({})",
        format_score(report.balance.organic_momentum.value),
        report.balance.organic_momentum.status.label(),
        format_score(report.balance.paid_dependency.value),
        report.balance.paid_dependency.status.label(),
        format_score(report.balance.cross_platform_stability.value),
        report.balance.cross_platform_stability.status.label()
    );
    println!(
        "Confidence: {} (completeness {} | consistency {} | reliability {})",
        report.confidence.overall.label(),
        format_percent(report.confidence.data_completeness),
        format_percent(report.confidence.signal_consistency),
        format_percent(report.confidence.strategy_reliability)
    );
    if !report.confidence.missing_sources.is_empty() {
        println!(
            "Missing sources: {}",
            report.confidence.missing_sources.join(", ")
        );
    }

    if let Some(market) = &report.market_context {
        println!(
            "Market context: {} ({} confidence) | crowded tags: {} | open tags: {}",
            market.overall_alignment.label(),
            market.confidence.label(),
            join_or_dash(&market.overrepresented_tags),
            join_or_dash(&market.underrepresented_tags)
        );
    }

    if !report.tensions.is_empty() {
        println!("\nTensions:");
        for tension in &report.tensions {
            println!("- [{}] {}: {}", tension.severity.label(), tension.title, tension.description);
        }
    }

    if !report.actions.is_empty() {
        println!("\nNext best actions:");
        for action in &report.actions {
            println!(
                "- [{}/{}] {}: {}",
                action.priority.label(),
                action.confidence_level.label(),
                action.title,
                action.rationale
            );
        }
    }

    if args.details {
        println!("\nAssets:");
        for asset in &report.assets {
            let fatigue = asset
                .fatigue
                .as_ref()
                .map(|f| format!("{} ({})", f.status.label(), format_float(f.score, 1)))
                .unwrap_or_else(|| "-".to_string());
            let momentum = asset
                .momentum
                .as_ref()
                .map(|m| {
                    format!(
                        "{} (velocity {})",
                        m.momentum.label(),
                        format_float(m.velocity_score, 1)
                    )
                })
                .unwrap_or_else(|| "-".to_string());
            println!("- {}: paid {} | organic {}", asset.asset_id, fatigue, momentum);
        }
        println!("\nCluster strategies:");
        for strategy in &report.strategies {
            println!(
                "- {} ({} confidence): {}",
                strategy.cluster_id,
                strategy.overall_confidence.label(),
                strategy.explanation
            );
            for rec in &strategy.recommendations {
                println!(
                    "    {} -> {} [{}]: {}",
                    rec.platform,
                    rec.action.label(),
                    rec.confidence.label(),
                    rec.rationale
                );
            }
        }
    }

    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    let config = AnalysisConfig::default();
    config.write(&args.path)?;
    println!("Wrote default config to {}", args.path.display());
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    if let Some(path) = path {
        return std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing input: pass --input or pipe JSON to stdin".to_string());
    }
    Ok(buffer)
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
