use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use league_elo::calculate;
use league_elo::chart_data;
use league_elo::clean;
use league_elo::config::LeagueConfig;
use league_elo::elo::EloConfig;
use league_elo::projections;
use league_elo::schedule_fetch;
use league_elo::store;

const DEFAULT_CONFIG_PATH: &str = "league.config";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Err(anyhow!("missing command"));
    };

    match command.as_str() {
        "getseason" => cmd_getseason(&args),
        "cleandata" => cmd_cleandata(&args),
        "calculate" => cmd_calculate(&args),
        "update" => cmd_update(&args),
        "projections" => cmd_projections(&args),
        "chartable" => cmd_chartable(&args),
        "revert" => cmd_revert(&args),
        other => {
            print_usage();
            Err(anyhow!("unknown command `{other}`"))
        }
    }
}

fn cmd_getseason(args: &[String]) -> Result<()> {
    let season_id = positional_arg(args)
        .ok_or_else(|| anyhow!("usage: league_elo getseason <season-id> [--config path]"))?;
    let mut config = load_config(args)?;
    if let Some(output_path) = parse_flag(args, "--output-path") {
        config.output_path = PathBuf::from(output_path);
    }
    let new_file = schedule_fetch::fetch_season(&config, &season_id)?;
    println!("{}", new_file.display());
    Ok(())
}

fn cmd_cleandata(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let new_file = clean::combine_seasons(&config)?;
    println!("{}", new_file.display());
    Ok(())
}

fn cmd_calculate(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let run = calculate::calculate(&config, &elo_config_from_env())?;
    println!("{}", run.results_path.display());
    println!("{}", run.snapshot_path.display());
    println!("Matches rated: {}", run.matches_rated);
    Ok(())
}

fn cmd_update(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let run = calculate::update(&config, &elo_config_from_env())?;
    println!("{}", run.results_path.display());
    println!("{}", run.snapshot_path.display());
    println!("Matches rated: {}", run.matches_rated);
    Ok(())
}

fn cmd_projections(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let new_file = projections::build_projections(&config, &elo_config_from_env())?;
    println!("{}", new_file.display());
    Ok(())
}

fn cmd_chartable(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let new_file = chart_data::build_chart_data(&config)?;
    println!("{}", new_file.display());
    Ok(())
}

fn cmd_revert(args: &[String]) -> Result<()> {
    let input = parse_flag(args, "--input")
        .ok_or_else(|| anyhow!("usage: league_elo revert --input file.json --output-dir dir"))?;
    let output_dir = parse_flag(args, "--output-dir")
        .ok_or_else(|| anyhow!("usage: league_elo revert --input file.json --output-dir dir"))?;
    let new_file = store::revert_snapshot(
        &PathBuf::from(input),
        &PathBuf::from(output_dir),
        &elo_config_from_env(),
    )?;
    println!("{}", new_file.display());
    Ok(())
}

fn load_config(args: &[String]) -> Result<LeagueConfig> {
    let path = parse_flag(args, "--config")
        .or_else(|| std::env::var("LEAGUE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    LeagueConfig::load(&PathBuf::from(&path)).with_context(|| format!("load league config {path}"))
}

fn elo_config_from_env() -> EloConfig {
    let mut cfg = EloConfig::default();
    if let Some(k) = std::env::var("LEAGUE_ELO_K")
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
    {
        cfg.k = k;
    }
    cfg
}

/// First non-flag argument after the command name.
fn positional_arg(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(flag) = arg.strip_prefix("--") {
            skip_next = !flag.contains('=');
            continue;
        }
        return Some(arg.clone());
    }
    None
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
        {
            let trimmed = next.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn print_usage() {
    println!("league_elo <command> [--config path]");
    println!();
    println!("Commands:");
    println!("  getseason <id>  Fetch one season's schedule into the raw data dir");
    println!("  cleandata       Combine fetched seasons into the clean results csv");
    println!("  calculate       Rate every result; writes rated csv + latest snapshot");
    println!("  update          Extend the snapshot with results newer than it");
    println!("  projections     Win probabilities for the next upcoming fixtures");
    println!("  chartable       Per-team rating-over-time json for charting");
    println!("  revert          Revert a snapshot to the mean (--input, --output-dir)");
}
