use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use etreemodel::script::{self, Command};
use etreemodel::{outline, EtreeModel, Layout, ModelConfig, ParserConfig, WriterConfig};

#[derive(Debug, Parser)]
#[command(
    name = "etreemodel",
    version,
    about = "Edit an XML document through its tree-view model"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Edit command, may be repeated (e.g. "add-child 0")
    #[arg(short = 'e', long = "exec", value_name = "CMD")]
    commands: Vec<String>,
    /// File with one edit command per line, run after --exec commands
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,
    /// Row layout under each element
    #[arg(short, long, value_enum, default_value_t = LayoutArg::Grouped)]
    layout: LayoutArg,
    /// Print the model rows instead of XML
    #[arg(long)]
    outline: bool,
    /// Write XML on a single line
    #[arg(long)]
    compact: bool,
    /// Verify the model mirrors the document after editing
    #[arg(long)]
    check: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Grouped,
    Flat,
}

impl From<LayoutArg> for Layout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Grouped => Layout::Grouped,
            LayoutArg::Flat => Layout::Flat,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let input = read_input(args.input.as_ref())?;
    let root = etreemodel::xml::Parser::with_config(input.as_bytes(), ParserConfig::default())
        .parse()
        .context("failed to parse input")?;
    let config = ModelConfig::default().with_layout(args.layout.into());
    let mut model = EtreeModel::with_config(root, config);

    let commands = collect_commands(&args)?;
    if !commands.is_empty() {
        let applied = script::run(&mut model, &commands).context("edit failed")?;
        info!("Applied {} of {} commands", applied, commands.len());
    }

    if args.check {
        model
            .hierarchy()
            .validate()
            .context("model does not mirror the document")?;
        info!("Model is consistent");
    }

    let rendered = if args.outline {
        outline(&model)
    } else if args.compact {
        model.to_xml_string(&WriterConfig::compact())
    } else {
        model.to_xml_string(&WriterConfig::default())
    };
    write_output(args.output.as_ref(), rendered.as_bytes())
}

fn collect_commands(args: &Args) -> Result<Vec<Command>> {
    let mut commands = args
        .commands
        .iter()
        .map(|line| {
            line.parse::<Command>()
                .with_context(|| format!("invalid command {line:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if let Some(path) = &args.script {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let parsed = script::parse_script(&source)
            .with_context(|| format!("invalid script {}", path.display()))?;
        commands.extend(parsed);
    }
    Ok(commands)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
