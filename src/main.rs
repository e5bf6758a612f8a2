use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use genealogy::config::{ImportOptions, LayoutDirection, Locale, parse_direction, parse_locale};
use genealogy::error::{ConfigError, ImportError};
use genealogy::import::{import, preview};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "genealogy-import", about = "Import GEDCOM and GeneWeb files as graph records")]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a file without converting it.
    Preview { file: PathBuf },
    /// Convert a file into nodes and edges.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct ImportArgs {
    file: PathBuf,

    #[arg(long, help = "Leave every node at the origin")]
    no_layout: bool,

    #[arg(long, help = "Emit sibling edges between children of a family")]
    siblings: bool,

    #[arg(long, env = "GENEALOGY_LAYOUT_DIRECTION", value_parser = parse_direction)]
    direction: Option<LayoutDirection>,

    #[arg(long, env = "GENEALOGY_LOCALE", value_parser = parse_locale)]
    locale: Option<Locale>,

    #[arg(long, help = "Do not tag records with the genealogy category")]
    no_tag: bool,

    #[arg(long, help = "Use one neutral style instead of coloring by sex")]
    plain_colors: bool,

    #[arg(long)]
    no_occupation: bool,

    #[arg(long)]
    no_notes: bool,
}

impl ImportArgs {
    fn apply(&self, options: &mut ImportOptions) {
        if self.no_layout {
            options.auto_layout = false;
        }
        if self.siblings {
            options.create_sibling_links = true;
        }
        if let Some(direction) = self.direction {
            options.layout_direction = direction;
        }
        if let Some(locale) = self.locale {
            options.locale = locale;
        }
        if self.no_tag {
            options.add_genealogy_tag = false;
        }
        if self.plain_colors {
            options.color_by_gender = false;
        }
        if self.no_occupation {
            options.import_occupation = false;
        }
        if self.no_notes {
            options.import_notes = false;
        }
    }
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Preview { file } => {
            let (name, bytes) = read_file(&file)?;
            print_json(&preview(&name, &bytes)?, cli.pretty)
        }
        Command::Import(args) => {
            let mut options = ImportOptions::from_env()?;
            args.apply(&mut options);
            let (name, bytes) = read_file(&args.file)?;
            print_json(&import(&name, &bytes, &options)?, cli.pretty)
        }
    }
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>), CliError> {
    let name = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => Ok((name, bytes)),
        Err(source) => Err(CliError::Read { path: name, source }),
    }
}

fn print_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{rendered}");
    Ok(())
}
