//! forcedata CLI
//!
//! Catalog commands build the fixture catalog, then:
//! - `makejson`: writes each exported fixture as a pretty JSON file
//! - `force`: writes the composition graph for the force-directed explorer
//! - `usagetree`: prints the composition graph as a script snippet
//!
//! The catalog is fully registered before anything is written, so a broken
//! fixture definition never leaves partial output behind.
//!
//! Type commands work from sample JSON files instead:
//! - `json2type`: infers record types and writes them as a YAML document
//! - `json2rs`: writes Rust model structs from that document or from samples

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use forcedata_factory::Factory;
use forcedata_fixtures::{Fixture, TEST_DATA};
use forcedata_typegen::{TypeDefinitions, TypeInferrer};

mod graph_export;

use graph_export::{GraphFormat, GraphSummary};

#[derive(Parser)]
#[command(name = "forcedata")]
#[command(
    author,
    version,
    about = "forcedata: composable test fixtures and their composition graph"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Debug logging and full error chains.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every exported fixture as a JSON file
    Makejson {
        /// Output directory (created if missing)
        #[arg(short, long, visible_alias = "outdir")]
        output: PathBuf,
    },

    /// Write the fixture composition graph for the force-directed explorer
    Force {
        /// Output file (parent directories are created)
        #[arg(short, long)]
        output: PathBuf,

        /// js (`var forceData = ...;`), json, or a self-contained html page
        #[arg(long, value_enum, default_value_t = GraphFormat::Js)]
        format: GraphFormat,
    },

    /// Print the fixture composition graph to stdout
    Usagetree,

    /// Infer record types from sample JSON files and write them as YAML
    #[command(name = "json2type")]
    Json2type {
        /// Sample files, e.g. `json/*.json` (quote it to keep the shell out)
        pattern: String,

        /// Output YAML file (parent directories are created)
        #[arg(short, long)]
        output: PathBuf,

        /// Type name for each sample's root object
        #[arg(short, long, default_value = "Base")]
        model: String,
    },

    /// Write Rust model structs from a type YAML or from sample JSON files
    #[command(name = "json2rs")]
    Json2rs {
        /// Sample files to infer types from
        #[arg(required_unless_present = "types", conflicts_with = "types")]
        pattern: Option<String>,

        /// Type YAML written by `json2type`
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// Output Rust source file (parent directories are created)
        #[arg(short, long)]
        output: PathBuf,

        /// Type name for each sample's root object
        #[arg(short, long, default_value = "Base")]
        model: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.global.verbose {
                eprintln!("{} {err:?}", "error:".red().bold());
            } else {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Makejson { output } => cmd_makejson(&build_catalog()?, output),
        Commands::Force { output, format } => cmd_force(&build_catalog()?, output, *format),
        Commands::Usagetree => cmd_usagetree(&build_catalog()?),
        Commands::Json2type {
            pattern,
            output,
            model,
        } => cmd_json2type(pattern, output, model),
        Commands::Json2rs {
            pattern,
            types,
            output,
            model,
        } => cmd_json2rs(pattern.as_deref(), types.as_deref(), output, model),
    }
}

fn build_catalog() -> Result<Factory<Fixture>> {
    let factory = forcedata_fixtures::catalog().context("failed to register fixtures")?;
    tracing::info!(
        fixtures = factory.len(),
        records = factory.graph_records().len(),
        "catalog registered"
    );
    Ok(factory)
}

fn cmd_makejson(factory: &Factory<Fixture>, outdir: &Path) -> Result<()> {
    // Serialize everything first: a missing fixture must not leave half a directory.
    let mut outputs: Vec<(PathBuf, String)> = Vec::with_capacity(TEST_DATA.len());
    for (file, id) in TEST_DATA {
        let fixture = factory
            .get(id)
            .with_context(|| format!("no fixture for {file}"))?;
        let mut text = serde_json::to_string_pretty(fixture)
            .with_context(|| format!("failed to serialize {id}"))?;
        text.push('\n');
        outputs.push((outdir.join(file), text));
    }

    fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create {}", outdir.display()))?;
    for (path, text) in outputs {
        println!("output {} ...", path.display());
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    }
    println!("{}", "Done".green().bold());
    Ok(())
}

fn cmd_force(factory: &Factory<Fixture>, output: &Path, format: GraphFormat) -> Result<()> {
    let records = factory.list_graph_records();
    let text = graph_export::render(format, &records)?;
    write_output(output, &text)?;

    let summary = GraphSummary::of(&records);
    tracing::debug!(
        nodes = summary.nodes,
        inherit_edges = summary.inherit_edges,
        contain_edges = summary.contain_edges,
        "graph written"
    );
    println!(
        "{} {} ({} fixtures, {} edges)",
        "Wrote".green().bold(),
        output.display(),
        summary.nodes,
        summary.edges()
    );
    println!("{}", "Done".green().bold());
    Ok(())
}

fn cmd_usagetree(factory: &Factory<Fixture>) -> Result<()> {
    let records = factory.list_graph_records();
    println!("{}", graph_export::render_usages(&records)?);
    println!("Done");
    Ok(())
}

fn cmd_json2type(pattern: &str, output: &Path, model: &str) -> Result<()> {
    let defs = infer_samples(pattern, model)?;
    let yaml = defs
        .to_yaml_string()
        .context("failed to serialize type definitions")?;
    write_output(output, &yaml)?;

    println!(
        "{} {} ({} types from {} files)",
        "Wrote".green().bold(),
        output.display(),
        defs.types.len(),
        defs.data_files.len()
    );
    println!("{}", "Done".green().bold());
    Ok(())
}

fn cmd_json2rs(
    pattern: Option<&str>,
    types: Option<&Path>,
    output: &Path,
    model: &str,
) -> Result<()> {
    let defs = match (types, pattern) {
        (Some(path), _) => TypeDefinitions::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, Some(pattern)) => infer_samples(pattern, model)?,
        (None, None) => anyhow::bail!("either a sample pattern or --types is required"),
    };
    let source = forcedata_typegen::render_rust(&defs).context("failed to generate Rust")?;
    write_output(output, &source)?;

    println!(
        "{} {} ({} structs)",
        "Wrote".green().bold(),
        output.display(),
        defs.types.len()
    );
    println!("{}", "Done".green().bold());
    Ok(())
}

fn infer_samples(pattern: &str, model: &str) -> Result<TypeDefinitions> {
    let files = forcedata_typegen::expand_pattern(pattern)?;
    let mut inferrer = TypeInferrer::new(model)?;
    for file in &files {
        println!("read {} ...", file.display());
        inferrer
            .add_file(file)
            .with_context(|| format!("failed to infer types from {}", file.display()))?;
    }
    let defs = inferrer.finish();
    tracing::info!(
        files = defs.data_files.len(),
        types = defs.types.len(),
        "types inferred"
    );
    Ok(defs)
}

/// Write `text` to `output`, creating parent directories first.
fn write_output(output: &Path, text: &str) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, text).with_context(|| format!("failed to write {}", output.display()))
}
