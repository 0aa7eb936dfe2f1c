mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use importfix_core::adapters::{ConsoleReporter, JsonLinesReporter};
use importfix_core::ports::Reporter;
use importfix_core::{ToolError, run};
use importfix_types::{BindingKind, UsagePattern, Vocabulary};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "importfix",
    version,
    about = "Normalizes React and Next.js imports and repairs data-file paths in place."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective vocabulary (symbols, modules, data rules).
    Vocab(VocabArgs),
}

#[derive(Debug, clap::Args)]
struct ProjectArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Config file (default: <project_root>/importfix.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Directory to scan, relative to the project root (default: app).
    #[arg(long)]
    scan_dir: Option<Utf8PathBuf>,

    /// Data directory, relative to the project root (default: data).
    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,

    /// Report what would change and print diffs without writing anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, clap::Args)]
struct VocabArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Some(Command::Vocab(args)) => cmd_vocab(args).map_err(ToolError::from),
        None => cmd_run(cli.run),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn load_config(project: &ProjectArgs) -> anyhow::Result<ConfigMerger> {
    let file_config = config::load_or_default(&project.project_root, project.config.as_deref())
        .context("load importfix.toml config")?;
    Ok(ConfigMerger::new(file_config))
}

fn cmd_run(args: RunArgs) -> Result<(), ToolError> {
    let merger = load_config(&args.project)?;
    let settings = merger.merge(CliOverrides {
        project_root: args.project.project_root,
        scan_dir: args.scan_dir,
        data_dir: args.data_dir,
        dry_run: args.dry_run,
    });
    debug!(
        "settings: scan_root={}, data_root={}, dry_run={}",
        settings.scan_root(),
        settings.data_root(),
        settings.dry_run
    );

    let mut reporter: Box<dyn Reporter> = match args.format {
        OutputFormat::Text => Box::new(ConsoleReporter::stdio()),
        OutputFormat::Json => Box::new(JsonLinesReporter::new(io::stdout())),
    };
    run(&settings, reporter.as_mut())?;
    Ok(())
}

fn binding_label(binding: BindingKind) -> &'static str {
    match binding {
        BindingKind::Named => "named",
        BindingKind::Default => "default",
    }
}

fn pattern_label(pattern: UsagePattern) -> &'static str {
    match pattern {
        UsagePattern::Reference => "reference",
        UsagePattern::Call => "call",
        UsagePattern::Element => "element",
    }
}

fn print_vocabulary(vocab: &Vocabulary) {
    println!("Client directive: '{}'", vocab.client_directive);
    println!();
    println!("  {:<24} {:<12} {:<8} USAGE", "SYMBOL", "MODULE", "BINDING");
    println!("  {:<24} {:<12} {:<8} -----", "------", "------", "-------");
    for module in vocab.modules_sorted() {
        for symbol in &module.symbols {
            println!(
                "  {:<24} {:<12} {:<8} {}",
                symbol.name,
                module.specifier,
                binding_label(symbol.binding),
                pattern_label(symbol.pattern)
            );
        }
    }
    println!();
    println!("Data alias: {}", vocab.data.alias);
    for rule in &vocab.data.rules {
        println!(
            "  {:<24} {:<20} {}",
            rule.keywords.join("|"),
            rule.binding,
            rule.file
        );
    }
}

fn cmd_vocab(args: VocabArgs) -> anyhow::Result<()> {
    let vocab = load_config(&args.project)?.vocabulary();
    match args.format {
        OutputFormat::Text => print_vocabulary(&vocab),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&vocab)?),
    }
    Ok(())
}
