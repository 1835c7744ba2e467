use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// Import from restyle-core
use restyle_core::{DocumentFormatter, FormatterConfig, FormattingReport, StepProfiler};

// Import CLI utilities
use restyle::{default_output_path, RunSummary};

/// Picked up from the working directory when `--config` is not given.
const LOCAL_CONFIG: &str = "restyle.yaml";

#[derive(Parser)]
#[command(name = "restyle")]
#[command(about = "Renumber chapters, convert numerals and restyle lists in a document")]
struct Args {
    /// Path to the document to format (JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to style config file (YAML format, default: ./restyle.yaml if present)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (default: <input>_restyled.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the formatting report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Enable timing of every pipeline step
    #[arg(long)]
    profile: bool,

    /// Exit with an error when conversion or configuration problems were reported
    #[arg(long)]
    strict: bool,
}

fn main() {
    // Initialize tracing with WARN level by default, respecting RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("❌ Formatting failed: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    println!("🦀 Restyle Document Formatter");

    let config = match &args.config {
        Some(path) => {
            let config = FormatterConfig::load_from_file(path)?;
            println!("📋 Loaded config from: {path}");
            config
        }
        None if Path::new(LOCAL_CONFIG).exists() => {
            println!("📋 Using {LOCAL_CONFIG} from the working directory");
            FormatterConfig::load_with_fallback(Some(LOCAL_CONFIG))
        }
        None => {
            println!("📋 Using default config");
            FormatterConfig::load_with_fallback(None)
        }
    };

    if args.show_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("no input document given (use --input <path>)");
    };
    if !input.exists() {
        anyhow::bail!("input document not found at: {}", input.display());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));

    tracing::debug!(
        "pipeline: {:?}",
        config
            .pipeline
            .rules
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
    );
    println!("📄 Processing: {}", input.display());
    let formatter = DocumentFormatter::new(config)?;
    let mut profiler = StepProfiler::new(args.profile);
    let report = formatter.format_file_with_profiling(input, &output, &mut profiler)?;

    print_report(&report);
    println!("💾 Formatted document saved to: {}", output.display());

    if let Some(report_path) = &args.report {
        save_report(&report, input, &output, args.config.as_deref(), report_path)?;
    }

    profiler.print_summary();

    if args.strict && report.has_problems() {
        anyhow::bail!(
            "{} conversion failures and {} configuration problems reported",
            report.conversion_failures.len(),
            report.configuration_errors.len()
        );
    }
    Ok(())
}

fn print_report(report: &FormattingReport) {
    println!("✅ Successfully formatted document");
    println!("📊 Formatting results:");
    println!("   - Rules applied: {}", report.rules_applied.join(", "));
    println!("   - Paragraphs renumbered: {}", report.paragraphs_renumbered);
    println!("   - Numerals converted: {}", report.numerals_converted);
    println!("   - Page breaks set: {}", report.page_breaks_set);
    println!("   - Bullet levels updated: {}", report.bullet_levels_updated);
    println!("   - List items terminated: {}", report.list_items_terminated);
    if let Some(lists) = &report.list_structure {
        println!(
            "   - Lists: {} ({} items, max depth {})",
            lists.group_count, lists.item_count, lists.max_depth
        );
    }

    for problem in &report.configuration_errors {
        println!("⚠️  Config: {problem}");
    }
    for failure in &report.conversion_failures {
        println!(
            "⚠️  Paragraph {} ({}): {}",
            failure.paragraph_index, failure.style_name, failure.error
        );
    }
}

fn save_report(
    report: &FormattingReport,
    input: &Path,
    output: &Path,
    config: Option<&str>,
    report_path: &Path,
) -> Result<()> {
    RunSummary::new(input, output, config, report).save(report_path)?;
    println!("💾 Report saved to: {}", report_path.display());
    Ok(())
}
