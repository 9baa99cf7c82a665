//! AsyncAPI to Flogo CLI
//!
//! Command-line interface for generating Flogo applications from AsyncAPI
//! documents.

use anyhow::{Context, Result};
use asyncapi_flogo_common::ModuleCatalog;
use asyncapi_flogo_generator::{AppGenerator, OutputKind};
use asyncapi_flogo_parser::{AsyncApiParser, CompileOptions, Role};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "asyncapi-flogo")]
#[command(version, about = "Generate Flogo applications from AsyncAPI documents", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    # Generate a Go API application from asyncapi.yml\n  \
    asyncapi-flogo\n\n  \
    # Generate a JSON descriptor for the client side of the channels\n  \
    asyncapi-flogo -i streetlights.yml -t flogodescriptor -r client -o ./app")]
struct Cli {
    /// Path to the AsyncAPI document (YAML or JSON)
    #[arg(short, long, default_value = "asyncapi.yml")]
    input: PathBuf,

    /// Kind of application to generate
    #[arg(short = 't', long = "type", value_enum, default_value_t = ConversionType::Flogoapiapp)]
    conversion_type: ConversionType,

    /// Directory to write the generated files to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Side of the channels the application plays
    #[arg(short, long, value_enum, default_value_t = RoleArg::Server)]
    role: RoleArg,

    /// Module catalog overriding the embedded module versions
    #[arg(long)]
    modules: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConversionType {
    /// Go program embedding the application descriptor
    Flogoapiapp,
    /// JSON application descriptor
    Flogodescriptor,
}

impl From<ConversionType> for OutputKind {
    fn from(value: ConversionType) -> Self {
        match value {
            ConversionType::Flogoapiapp => OutputKind::ApiApp,
            ConversionType::Flogodescriptor => OutputKind::Descriptor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    /// Subscribe operations are received, publish operations are sent
    Server,
    /// Subscribe operations are sent, publish operations are received
    Client,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Server => Role::Server,
            RoleArg::Client => Role::Client,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let catalog = match &cli.modules {
        Some(path) => {
            println!("{} Loading module catalog: {}", "→".cyan(), path.display());
            ModuleCatalog::load(path)
                .with_context(|| format!("Failed to load module catalog {}", path.display()))?
        }
        None => ModuleCatalog::embedded().context("Failed to load embedded module catalog")?,
    };
    let options = CompileOptions::new(catalog).with_role(cli.role.into());

    println!("{} Parsing AsyncAPI document: {}", "→".cyan(), cli.input.display());
    let parser = AsyncApiParser::from_file(&cli.input)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    if cli.verbose {
        let document = parser.document();
        println!("  AsyncAPI: {}", document.asyncapi);
        println!("  Application: {}", document.app_name());
        println!("  Servers: {}", document.servers.len());
        println!("  Channels: {}", document.channels.len());
        println!("  Role: {:?}", options.role);
    }

    println!("{} Compiling protocol bindings...", "→".cyan());
    let compilation = parser
        .compile(&options)
        .context("Failed to compile AsyncAPI document")?;

    let app = &compilation.app;
    println!(
        "{} Compiled {} triggers, {} resources, {} properties",
        "✓".green(),
        app.triggers.len(),
        app.resources.len(),
        app.properties.len()
    );

    for warning in &compilation.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }

    if cli.verbose {
        println!("\n{}", "Triggers:".bold());
        for trigger in &app.triggers {
            println!(
                "  • {} ({} handlers) {}",
                trigger.id.cyan(),
                trigger.handlers.len(),
                trigger.reference
            );
        }
        println!("\n{}", "Imports:".bold());
        for import in &app.imports {
            println!("  • {}", import);
        }
    }

    let kind: OutputKind = cli.conversion_type.into();
    println!(
        "{} Generating {} into {}",
        "→".cyan(),
        kind.identifier().yellow(),
        cli.output.display()
    );
    let generator = AppGenerator::new(compilation).context("Failed to load templates")?;
    let written = generator
        .generate_to_directory(&cli.output, kind)
        .with_context(|| format!("Failed to write output to {}", cli.output.display()))?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    for path in &written {
        println!("  📄 {}", path.display());
    }

    Ok(())
}
