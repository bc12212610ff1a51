use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pr_ingestion::{
    config::AppConfig,
    observability,
    pipeline::DuplicatePolicy,
    report,
    sources::cells::parse_date,
};
use time::Date;

/// Merges daily PR and GHI files and renders the performance chart.
#[derive(Debug, Parser)]
#[command(name = "pr-report", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge, write the processed table and render the chart (default).
    Run(RunArgs),
    /// Report what the PR and GHI folders contain.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct FolderArgs {
    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pr_folder: Option<PathBuf>,
    #[arg(long)]
    ghi_folder: Option<PathBuf>,
}

impl FolderArgs {
    fn load(&self) -> Result<AppConfig> {
        let mut cfg = AppConfig::load(self.config.as_deref())?;
        if let Some(p) = &self.pr_folder {
            cfg.pr_folder = p.clone();
        }
        if let Some(p) = &self.ghi_folder {
            cfg.ghi_folder = p.clone();
        }
        Ok(cfg)
    }
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    folders: FolderArgs,
    #[arg(long)]
    output_csv: Option<PathBuf>,
    /// First plotted date, YYYY-MM-DD.
    #[arg(long, value_parser = iso_date)]
    start_date: Option<Date>,
    /// Last plotted date, YYYY-MM-DD.
    #[arg(long, value_parser = iso_date)]
    end_date: Option<Date>,
    /// Chart path; `.svg` writes SVG, otherwise a bitmap.
    #[arg(long)]
    output_file: Option<PathBuf>,
    /// First day of plant year 0, YYYY-MM-DD.
    #[arg(long, value_parser = iso_date)]
    anchor_date: Option<Date>,
    /// Drop readings dated before this while merging, YYYY-MM-DD.
    #[arg(long, value_parser = iso_date)]
    accept_from: Option<Date>,
    /// Drop readings dated after this while merging, YYYY-MM-DD.
    #[arg(long, value_parser = iso_date)]
    accept_until: Option<Date>,
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatePolicy>,
    #[arg(long)]
    dpi: Option<u32>,
    /// Reuse an existing processed table instead of scanning the folders.
    #[arg(long)]
    from_processed: Option<PathBuf>,
}

impl RunArgs {
    fn load(&self) -> Result<AppConfig> {
        let mut cfg = self.folders.load()?;
        if let Some(p) = &self.output_csv {
            cfg.output_csv = p.clone();
        }
        if let Some(p) = &self.output_file {
            cfg.output_file = p.clone();
        }
        if self.start_date.is_some() {
            cfg.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            cfg.end_date = self.end_date;
        }
        if self.accept_from.is_some() {
            cfg.accept_from = self.accept_from;
        }
        if self.accept_until.is_some() {
            cfg.accept_until = self.accept_until;
        }
        if self.anchor_date.is_some() {
            cfg.target.anchor_date = self.anchor_date;
        }
        if let Some(d) = self.duplicates {
            cfg.duplicates = d;
        }
        if let Some(dpi) = self.dpi {
            cfg.chart.dpi = dpi;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    folders: FolderArgs,
}

fn iso_date(s: &str) -> Result<Date, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    observability::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Check(args)) => {
            let cfg = args.folders.load()?;
            report::check_folders(&cfg)?;
        }
        Some(Command::Run(args)) => run(&args)?,
        None => run(&cli.run)?,
    }

    Ok(())
}

fn run(args: &RunArgs) -> Result<()> {
    let cfg = args.load()?;
    let chart = report::run(&cfg, args.from_processed.as_deref())?;
    tracing::info!(
        table = %cfg.output_csv.display(),
        chart = %cfg.output_file.display(),
        points = chart.points.len(),
        "report complete"
    );
    Ok(())
}
