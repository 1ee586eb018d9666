use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use catalog::{ExperimentDescriptor, ExperimentRegistry};
use labconfig::PlaygroundConfig;
use playground::{DeviceCapabilities, PlaygroundManager};
use tracing_subscriber::EnvFilter;

use crate::cli::{
    CheckArgs, Cli, Command, DeviceArgs, ListArgs, ParseArgs, ShareArgs, ShowArgs, StatsArgs,
};
use crate::paths::AppPaths;

pub fn initialise_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let manager = build_manager(&cli)?;
    match cli.command {
        Command::List(args) => run_list(&manager, args),
        Command::Show(args) => run_show(&manager, args),
        Command::Check(args) => run_check(&manager, args),
        Command::Share(args) => run_share(&manager, args),
        Command::Parse(args) => run_parse(&manager, args),
        Command::Stats(args) => run_stats(&manager, args),
    }
}

fn build_manager(cli: &Cli) -> Result<PlaygroundManager> {
    // The config directory is only consulted for inputs not given on the command line.
    let paths = match (&cli.config, &cli.catalog) {
        (Some(_), Some(_)) => None,
        _ => Some(AppPaths::discover()?),
    };
    let default_file = |file: fn(&AppPaths) -> PathBuf| {
        paths.as_ref().map(file).filter(|path| path.exists())
    };

    let config_path = cli.config.clone().or_else(|| default_file(AppPaths::config_file));
    let config = match config_path {
        Some(path) => PlaygroundConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PlaygroundConfig::default(),
    };

    let catalog_path = cli.catalog.clone().or_else(|| default_file(AppPaths::catalog_file));
    let registry = match catalog_path {
        Some(path) => ExperimentRegistry::load(&path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => ExperimentRegistry::builtin(),
    };

    tracing::debug!(
        config_dir = ?paths.as_ref().map(|paths| paths.config_dir().display().to_string()),
        experiments = registry.len(),
        "resolved labctl inputs"
    );
    Ok(PlaygroundManager::new(registry, config))
}

fn run_list(manager: &PlaygroundManager, args: ListArgs) -> Result<()> {
    let experiments = match args.family {
        Some(family) => manager.experiments_by_family(family),
        None => manager.all_experiments(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(experiments.as_slice())?);
        return Ok(());
    }

    for experiment in experiments.iter() {
        println!(
            "{:<12} {:<7} {:<10} {:<13} {:<7} {}",
            experiment.id(),
            experiment.family(),
            experiment.category(),
            experiment.difficulty(),
            experiment.performance(),
            experiment.title()
        );
    }
    Ok(())
}

fn run_show(manager: &PlaygroundManager, args: ShowArgs) -> Result<()> {
    let experiment = require_experiment(manager, &args.id)?;
    let metadata = manager
        .experiment_metadata(&args.id)
        .ok_or_else(|| anyhow!("no metadata for experiment '{}'", args.id))?;

    if args.json {
        let value = serde_json::json!({
            "experiment": experiment,
            "metadata": &*metadata,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} ({})", experiment.title(), experiment.id());
    if !experiment.description().is_empty() {
        println!("  {}", experiment.description());
    }
    println!("  family:        {}", experiment.family());
    println!("  category:      {}", experiment.category());
    println!("  difficulty:    {}", experiment.difficulty());
    println!("  performance:   {}", experiment.performance());
    if !experiment.technology().is_empty() {
        println!("  technology:    {}", experiment.technology().join(", "));
    }
    println!("  entry:         {}", experiment.render_entry().as_str());
    println!("  webgl:         {}", metadata.requires_webgl);
    println!("  webgl2:        {}", metadata.requires_webgl2);
    println!("  memory:        {}", metadata.estimated_memory_usage);
    println!("  target-fps:    {}", metadata.target_fps);
    Ok(())
}

fn run_check(manager: &PlaygroundManager, args: CheckArgs) -> Result<()> {
    require_experiment(manager, &args.id)?;
    let capabilities = resolve_capabilities(&args.device)?;
    let compatibility = manager.is_experiment_compatible(&args.id, &capabilities);
    let settings = manager
        .recommended_settings(&args.id, &capabilities)
        .ok_or_else(|| anyhow!("no recommendation for experiment '{}'", args.id))?;

    if args.json {
        let value = serde_json::json!({
            "compatibility": compatibility,
            "settings": settings,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match compatibility.reason {
        None => println!("compatible:    yes"),
        Some(reason) => println!("compatible:    no ({reason})"),
    }
    println!("target-fps:    {}", settings.target_fps);
    println!("quality:       {}", settings.quality_level);
    println!("optimizations: {}", settings.enable_optimizations);
    Ok(())
}

fn run_share(manager: &PlaygroundManager, args: ShareArgs) -> Result<()> {
    require_experiment(manager, &args.id)?;
    let capabilities = resolve_capabilities(&args.device)?;
    let settings = manager
        .recommended_settings(&args.id, &capabilities)
        .ok_or_else(|| anyhow!("no recommendation for experiment '{}'", args.id))?;
    let state = manager.create_share_data(&args.id, settings, &capabilities);

    let url = match args.base.as_deref() {
        Some(base) => playground::generate_share_url_with_base(base, &state),
        None => manager.generate_share_url(&state),
    };
    println!("{url}");
    Ok(())
}

fn run_parse(manager: &PlaygroundManager, args: ParseArgs) -> Result<()> {
    let Some(session) = manager.parse_share_url(&args.url) else {
        bail!("'{}' is not a share link: no experiment parameter", args.url);
    };
    if manager.experiment(&session.experiment_id).is_none() {
        tracing::warn!(
            experiment = %session.experiment_id,
            "share link names an experiment missing from the catalog"
        );
    }
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

fn run_stats(manager: &PlaygroundManager, args: StatsArgs) -> Result<()> {
    let stats = manager.statistics();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&*stats)?);
        return Ok(());
    }

    println!("total:         {}", stats.total_experiments);
    println!("design:        {}", stats.design_experiments);
    println!("webgl:         {}", stats.webgl_experiments);
    println!("needs webgl:   {}", stats.requires_webgl);
    println!("needs webgl2:  {}", stats.requires_webgl2);
    println!("by difficulty:");
    for (difficulty, count) in &stats.by_difficulty {
        println!("  {difficulty:<13} {count}");
    }
    println!("by category:");
    for (category, count) in &stats.by_category {
        println!("  {category:<13} {count}");
    }
    Ok(())
}

fn require_experiment<'a>(
    manager: &'a PlaygroundManager,
    id: &str,
) -> Result<&'a ExperimentDescriptor> {
    manager
        .experiment(id)
        .ok_or_else(|| anyhow!("unknown experiment '{id}'"))
}

fn resolve_capabilities(args: &DeviceArgs) -> Result<DeviceCapabilities> {
    let mut capabilities = match &args.caps {
        Some(path) => load_capabilities(path)?,
        None => DeviceCapabilities::default(),
    };

    if args.no_webgl {
        capabilities.webgl_support = false;
        capabilities.webgl2_support = false;
    }
    if args.no_webgl2 {
        capabilities.webgl2_support = false;
    }
    if let Some(level) = args.performance {
        capabilities.performance_level = level;
    }
    if let Some(memory) = args.memory {
        capabilities.memory_limit = memory;
    }
    if args.touch {
        capabilities.touch_support = true;
    }
    if let Some(dpr) = args.dpr {
        if !dpr.is_finite() || dpr <= 0.0 {
            bail!("--dpr must be a positive number");
        }
        capabilities.device_pixel_ratio = dpr;
    }
    if let Some(cores) = args.cores {
        capabilities.hardware_concurrency = cores;
    }
    if let Some(size) = args.max_texture_size {
        capabilities.max_texture_size = size;
    }
    Ok(capabilities)
}

fn load_capabilities(path: &Path) -> Result<DeviceCapabilities> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read capabilities from {}", path.display()))?;
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    let capabilities = if is_json {
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse capabilities JSON at {}", path.display()))?
    } else {
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse capabilities TOML at {}", path.display()))?
    };
    Ok(capabilities)
}
