// Venue Scoring - command line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use venue_scoring::{
    contract_deviation, load_records, simulate_rent_reduction, write_json, EngineConfig, ScoringEngine, Semaphore,
    DEFAULT_USD_ARS_RATE, VERSION,
};

#[derive(Parser)]
#[command(name = "venue-scoring", version, about = "Score and classify event venues")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scoring pipeline over a CSV or JSON export
    Process {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Engine config JSON (defaults are used when omitted)
        #[arg(short, long, env = "VENUE_SCORING_CONFIG")]
        config: Option<PathBuf>,
    },

    /// What-if: cut a venue's rent by a percentage
    Simulate {
        #[arg(long)]
        fixed: f64,

        #[arg(long)]
        sales: f64,

        #[arg(long, default_value_t = 0.0)]
        variable: f64,

        /// Percent, 0..=100
        #[arg(long)]
        reduction: f64,
    },

    /// Contract audit: agreed USD rent vs. pesos actually paid
    Audit {
        #[arg(long)]
        contract_usd: f64,

        #[arg(long)]
        paid_ars: f64,

        #[arg(long, default_value_t = DEFAULT_USD_ARS_RATE)]
        rate: f64,
    },

    /// Print the default engine config as JSON
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process { input, output, config } => run_process(&input, &output, config.as_deref()),
        Command::Simulate {
            fixed,
            sales,
            variable,
            reduction,
        } => {
            run_simulate(fixed, sales, variable, reduction);
            Ok(())
        }
        Command::Audit {
            contract_usd,
            paid_ars,
            rate,
        } => {
            let audit = contract_deviation(contract_usd, paid_ars, rate);
            println!("📑 Contract audit at {:.2} ARS/USD", rate);
            println!("   Contract amount: {:.2}", audit.contract_amount);
            println!("   Real payment:    {:.2}", audit.real_payment);
            println!("   Deviation:       {:.2} ({:+.2}%)", audit.deviation, audit.deviation_percent);
            println!("   Color:           {}", audit.color);
            Ok(())
        }
        Command::Config => {
            let json = serde_json::to_string_pretty(&EngineConfig::default())?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn run_process(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    println!("🏛️  Venue Scoring v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = ScoringEngine::new(config).context("Invalid engine configuration")?;

    // 1. Load
    println!("\n📂 Loading {:?}...", input);
    let raw = load_records(input)?;
    println!("✓ Loaded {} rows", raw.len());

    // 2. Score
    println!("\n🧮 Scoring...");
    let run = engine.run(&raw);
    let report = &run.report;
    println!("✓ Processable: {}", report.processable);
    println!("✓ Excluded:    {}", report.excluded);
    println!(
        "✓ Profitability: {} eligible, margin target {:.0}",
        report.profitability.eligible, report.profitability.margin_target
    );
    println!("✓ Benchmarking:  {} eligible", report.benchmark_eligible);
    println!(
        "✓ Efficiency:    {} eligible, {} indexed",
        report.efficiency.eligible, report.efficiency.indexed
    );
    if report.malformed_values > 0 || report.placeholder_values > 0 {
        println!("⚠️  {}", run.quality.summary());
    }

    // 3. Global status breakdown
    let mut counts = [0usize; 3];
    for record in run.records.iter().filter(|r| r.profitability.assessed) {
        match engine.status_of(record).color {
            Semaphore::Green => counts[0] += 1,
            Semaphore::Yellow => counts[1] += 1,
            _ => counts[2] += 1,
        }
    }
    println!("\n🚦 Global status: {} green, {} yellow, {} red", counts[0], counts[1], counts[2]);

    // 4. Write
    write_json(output, &run.outputs())?;
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Wrote {} venues to {:?} (run {})", run.records.len(), output, run.run_id);

    Ok(())
}

fn run_simulate(fixed: f64, sales: f64, variable: f64, reduction: f64) {
    let result = simulate_rent_reduction(fixed, sales, variable, reduction);

    println!("🔮 Rent reduction of {:.1}%", reduction);
    println!("   New fixed costs:    {:.2}", result.new_fixed_costs);
    println!("   New rent incidence: {:.2}%", result.new_incidence);
    println!("   New margin:         {:.2}", result.new_margin);
    println!("   Margin improvement: {:.2}", result.margin_improvement);
}
