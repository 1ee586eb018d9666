use std::path::PathBuf;

use catalog::{Family, PerformanceLevel};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "labctl",
    author,
    version,
    about = "Experiment playground inspector"
)]
pub struct Cli {
    /// Policy configuration (TOML). Defaults to `config.toml` in the labctl config directory.
    #[arg(long, global = true, value_name = "FILE", env = "LABCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog manifest replacing the built-in experiments.
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Log at debug level (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List experiments in catalog order.
    List(ListArgs),
    /// Show one experiment and its derived metadata.
    Show(ShowArgs),
    /// Check whether a device can run an experiment and how it should run.
    Check(CheckArgs),
    /// Build a share link for an experiment on a device.
    Share(ShareArgs),
    /// Decode a share link.
    Parse(ParseArgs),
    /// Print catalog statistics.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Restrict to one family: `design` or `webgl`.
    #[arg(long, value_name = "FAMILY", value_parser = parse_family)]
    pub family: Option<Family>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub device: DeviceArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShareArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub device: DeviceArgs,

    /// Page the link should point at (e.g. `https://example.com/playground`).
    #[arg(long, value_name = "URL")]
    pub base: Option<String>,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[arg(value_name = "URL")]
    pub url: String,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

/// Device capability snapshot: an optional file plus individual overrides.
#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// Capability snapshot as TOML or JSON (by extension).
    #[arg(long, value_name = "FILE")]
    pub caps: Option<PathBuf>,

    /// Device has no WebGL (implies no WebGL2).
    #[arg(long)]
    pub no_webgl: bool,

    /// Device has no WebGL2.
    #[arg(long)]
    pub no_webgl2: bool,

    /// Device performance tier: `low`, `medium` or `high`.
    #[arg(long, value_name = "LEVEL", value_parser = parse_performance)]
    pub performance: Option<PerformanceLevel>,

    /// Memory budget in the catalog's relative units.
    #[arg(long, value_name = "UNITS")]
    pub memory: Option<u32>,

    /// Device supports touch input.
    #[arg(long)]
    pub touch: bool,

    #[arg(long, value_name = "RATIO")]
    pub dpr: Option<f32>,

    /// Logical core count.
    #[arg(long, value_name = "COUNT")]
    pub cores: Option<u32>,

    #[arg(long, value_name = "PIXELS")]
    pub max_texture_size: Option<u32>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_family(raw: &str) -> Result<Family, String> {
    raw.parse()
}

fn parse_performance(raw: &str) -> Result<PerformanceLevel, String> {
    raw.parse()
}
