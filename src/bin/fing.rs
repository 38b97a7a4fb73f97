//! fing: check fingering documents and render fingering charts.
//!
//! # Usage
//!
//! ```bash
//! # Validate one or more fingering files
//! fing check recorder.toml flute.toml
//!
//! # Render C5 and D5 charts into ./charts
//! fing render -f recorder.toml -l recorder.layout.toml -n C5 -n D5 -o charts
//!
//! # Render every note
//! fing render -f recorder.toml -l recorder.layout.toml -o charts
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingerlib::{
    fingering_system_to_json, load_fingering_file, load_layout_file, render_all, render_chart,
    FingeringOptions, LayoutOptions, PitchedNote,
};

/// Fingering chart checker and renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate fingering files; prints "ok" or one error line per bad file
    Check {
        /// Fingering TOML files
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Render fingering charts as SVG files
    Render {
        /// Fingering TOML file
        #[arg(short, long, value_name = "FILE")]
        fingering: PathBuf,

        /// Layout TOML file
        #[arg(short, long, value_name = "FILE")]
        layout: PathBuf,

        /// Notes to render (all notes when omitted)
        #[arg(short = 'n', long = "note", value_name = "NOTE")]
        notes: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Print a validated fingering system as JSON
    Json {
        /// Fingering TOML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Don't require fingerings to follow the order of `all`
    #[arg(long)]
    no_order_check: bool,

    /// Let enharmonic spellings of one note replace each other
    #[arg(long)]
    allow_aliases: bool,
}

impl BuildArgs {
    fn options(&self) -> FingeringOptions {
        FingeringOptions {
            check_key_order: !self.no_order_check,
            allow_enharmonic_aliases: self.allow_aliases,
            ..FingeringOptions::default()
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Check { files, build } => Ok(check(&files, &build.options())),
        Command::Render {
            fingering,
            layout,
            notes,
            out,
            build,
        } => {
            render(&fingering, &layout, &notes, &out, &build.options())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Json { file, build } => {
            let system = load_fingering_file(&file, &build.options())
                .with_context(|| format!("Failed to load {}", file.display()))?;
            println!("{}", fingering_system_to_json(&system)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validate each file independently and report on stderr.
fn check(files: &[PathBuf], options: &FingeringOptions) -> ExitCode {
    let errors: Vec<String> = files
        .iter()
        .filter_map(|f| {
            debug!(file = %f.display(), "checking");
            let err = load_fingering_file(f, options).err()?;
            Some(format!(
                "ERROR: {}: {}",
                f.display(),
                err.to_string().replace('\n', "; ")
            ))
        })
        .collect();

    if errors.is_empty() {
        eprintln!("ok");
        ExitCode::SUCCESS
    } else {
        for line in &errors {
            eprintln!("{line}");
        }
        ExitCode::FAILURE
    }
}

fn render(
    fingering: &Path,
    layout_path: &Path,
    notes: &[String],
    out: &Path,
    options: &FingeringOptions,
) -> anyhow::Result<()> {
    let system = load_fingering_file(fingering, options)
        .with_context(|| format!("Failed to load {}", fingering.display()))?;
    let layout = load_layout_file(layout_path, &system, &LayoutOptions::default())
        .with_context(|| format!("Failed to load {}", layout_path.display()))?;

    let charts = if notes.is_empty() {
        render_all(&system, &layout)
    } else {
        let mut charts = Vec::new();
        for text in notes {
            let note: PitchedNote = text.parse()?;
            let Some(svg) = render_chart(&system, &layout, &note) else {
                bail!("No fingering for {note}");
            };
            charts.push((note, svg));
        }
        charts
    };

    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    for (note, svg) in &charts {
        let path = out.join(format!("{}.svg", note.name()));
        std::fs::write(&path, svg)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote chart");
    }
    Ok(())
}
