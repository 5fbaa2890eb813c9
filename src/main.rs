use clap::{Parser, Subcommand};
use shaker_docs::config;
use shaker_docs::output::{self, RunKind};
use shaker_docs::page::SuppliedInputs;
use shaker_docs::pipeline::{self, BuildOptions};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "shaker-docs")]
#[command(about = "Static documentation generator for vibration-test shakers")]
#[command(long_about = "\
Static documentation generator for vibration-test shakers

Every TOML file in the input directory describes one shaker and becomes one
HTML page. An index page links them all.

Input structure:

  input/
  ├── config.toml                  # Site config (optional)
  ├── apex-ds5000.toml             # One file per shaker
  ├── images/apex-ds5000.jpg       # Referenced by `image = ...`
  └── manuals/apex-ds5000.pdf      # Referenced by `manual = ...`
  templates/
  └── static/                      # Copied to <output>/static/

Document format:

  [shaker]
  manufacturer = \"Apex\"
  model = \"DS-5000\"
  nominal_force = 5000            # [N] Sine force, peak

  [input_parameters]
  payload_mass = \"float\"          # [kg] Test article mass

  [additional_checks]
  force_margin = \"nominal_force * 0.9 > payload_mass * 9.81\"

Trailing `# [unit] description` comments are shown next to each value.
Checks that need input parameters show as awaiting input unless values are
supplied with --set.

Run 'shaker-docs gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the equipment documents
    #[arg(long, default_value = "input", global = true)]
    input: PathBuf,

    /// Directory holding the static/ assets directory
    #[arg(long, default_value = "templates", global = true)]
    templates: PathBuf,

    /// Output directory
    #[arg(long, default_value = "docs", global = true)]
    output: PathBuf,

    /// Supply an input-parameter value (repeatable), e.g. --set payload_mass=40
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, global = true)]
    set: Vec<(String, f64)>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site (default)
    Build,
    /// Parse documents and evaluate checks without writing output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }
    Ok((name.to_string(), value))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = BuildOptions {
        input_dir: cli.input,
        templates_dir: cli.templates,
        output_dir: cli.output,
        inputs: cli.set.into_iter().collect::<SuppliedInputs>(),
    };

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let report = pipeline::build_site(&options, |doc| {
                output::print_document_report(doc, RunKind::Build)
            })?;
            output::print_build_summary(&report, RunKind::Build);
        }
        Command::Check => {
            let report = pipeline::check_site(&options, |doc| {
                output::print_document_report(doc, RunKind::Check)
            })?;
            output::print_build_summary(&report, RunKind::Check);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
