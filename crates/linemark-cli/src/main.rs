// SPDX-License-Identifier: AGPL-3.0-or-later
//! linemark - converts line-oriented markup documents
//!
//! Each input is parsed, rendered to the chosen format and written next to
//! the input unless `--output`, `--stdout` or a configured `output_dir`
//! says otherwise.

use anyhow::{bail, Context, Result};
use clap::Parser;
use linemark_core::file_ops::{default_output_path, open_file, render_to_bytes};
use linemark_core::OutputFormat;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{FileConfig, Overrides, Settings};

/// Convert line-oriented markup to HTML, printable HTML, XML or Markdown.
#[derive(Parser, Debug)]
#[command(name = "linemark", version, about)]
struct Cli {
    /// Output format: html, pdf, xml, blog or markdown
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Stylesheet for HTML output (repeatable)
    #[arg(short = 's', long = "stylesheet", value_name = "PATH")]
    stylesheets: Vec<PathBuf>,

    /// Link stylesheets instead of embedding them
    #[arg(long)]
    no_embed: bool,

    /// Language attribute of XML articles
    #[arg(long)]
    lang: Option<String>,

    /// Output file (single input only)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the result to standard output
    #[arg(long)]
    stdout: bool,

    /// Configuration file instead of a discovered linemark.toml
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Source documents
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "linemark=debug,linemark_core=debug"
    } else {
        "linemark=info,linemark_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output can only be used with a single input");
    }

    let flags = Overrides {
        format: cli.format,
        stylesheets: cli.stylesheets.clone(),
        no_embed: cli.no_embed,
        lang: cli.lang.clone(),
    };

    for input in &cli.inputs {
        let file = FileConfig::discover(cli.config.as_deref(), input)?;
        let settings = Settings::resolve(file, &flags);
        convert(input, cli, &settings)
            .with_context(|| format!("converting {}", input.display()))?;
    }
    Ok(())
}

fn convert(input: &Path, cli: &Cli, settings: &Settings) -> Result<()> {
    let opened = open_file(input)?;
    tracing::debug!(
        input = %input.display(),
        encoding = opened.file_info.encoding,
        bytes = opened.file_info.size,
        format = %settings.format,
        "converting"
    );
    let bytes = render_to_bytes(&opened.document, settings.format, &settings.render)?;

    if cli.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes).context("writing to stdout")?;
        return Ok(());
    }

    let output = output_path(input, cli.output.as_deref(), settings);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(output = %output.display(), "written");
    Ok(())
}

fn output_path(input: &Path, explicit: Option<&Path>, settings: &Settings) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let beside = default_output_path(input, settings.format);
    match (&settings.output_dir, beside.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => beside,
    }
}
