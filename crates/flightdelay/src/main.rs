//! `flightdelay` - CLI for flight delay analytics
//!
//! Loads the stored flights into an in-memory collection, runs the requested
//! analysis, and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use flightdelay::analytics::{
    evaluate_accuracy, frequent_delayed_airlines, sort_records, top_delays,
};
use flightdelay::cli::{
    Cli, Command, ConfigCommand, EstimateCommand, FrequentCommand, GenerateCommand, InfoCommand,
    OutputFormat, ReportCommand, SortedCommand, TopCommand,
};
use flightdelay::generate::{GenerationProfile, SampleGenerator};
use flightdelay::{init_logging, Config, Error, FlightCollection, FlightRecord, Storage};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Generate(cmd) => handle_generate(&config, &cmd),
        Command::Sorted(cmd) => handle_sorted(&config, &cmd),
        Command::Top(cmd) => handle_top(&config, &cmd),
        Command::Frequent(cmd) => handle_frequent(&config, &cmd),
        Command::Estimate(cmd) => handle_estimate(&config, &cmd),
        Command::Report(cmd) => handle_report(&config, &cmd),
        Command::Info(cmd) => handle_info(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening flight database {}", path.display()))
}

fn load_collection(storage: &Storage) -> Result<FlightCollection> {
    let flights = storage.load_flights().context("loading stored flights")?;
    Ok(FlightCollection::from_records(flights)?)
}

fn handle_generate(config: &Config, cmd: &GenerateCommand) -> Result<()> {
    let mut storage = open_storage(config)?;
    let mut collection = load_collection(&storage)?;

    let (profile, default_count) = if cmd.realtime {
        (GenerationProfile::RealTime, config.generation.realtime_count)
    } else {
        (GenerationProfile::Batch, config.generation.batch_size)
    };
    let count = cmd.count.unwrap_or(default_count);
    let mut generator = match cmd.seed.or(config.generation.seed) {
        Some(seed) => SampleGenerator::with_seed(profile, seed),
        None => SampleGenerator::new(profile),
    };

    info!(count, ?profile, "generating flights");
    for _ in 0..count {
        let id = collection.next_flight_id(profile.id_base());
        let flight = generator.flight(id, Utc::now())?;
        if !cmd.no_persist {
            storage.save_flight(&flight)?;
        }
        collection.push(flight.clone())?;

        if cmd.realtime {
            println!(
                "[RT] {} | {} | {}->{} | delay {} min | estimate {} min",
                flight.id,
                flight.airline,
                flight.origin,
                flight.destination,
                flight.actual_delay,
                collection.estimate(&flight)
            );
        }
    }

    if !cmd.no_persist {
        storage.save_airline_stats(collection.stats())?;
    }
    println!(
        "Generated {count} flights ({} in collection)",
        collection.len()
    );
    Ok(())
}

fn print_flights(title: &str, flights: &[FlightRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(flights)?),
        OutputFormat::Table => {
            println!("{title}");
            println!("{}", "=".repeat(title.len()));
            for f in flights {
                println!(
                    "{:<8} | {:<16} | {}->{} | {:>4} min | W {:>4.1} T {:>4.1} X {:>4.1}",
                    f.id,
                    f.airline.name(),
                    f.origin,
                    f.destination,
                    f.actual_delay,
                    f.weather_score,
                    f.traffic_score,
                    f.technical_score
                );
            }
        }
    }
    Ok(())
}

fn handle_sorted(config: &Config, cmd: &SortedCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let collection = load_collection(&storage)?;

    let sorted = sort_records(collection.records(), cmd.key.into(), cmd.direction());
    let limit = cmd.limit.unwrap_or(config.analytics.display_limit);
    let shown = &sorted[..limit.min(sorted.len())];
    print_flights(
        &format!("Sorted flights ({:?}, {:?})", cmd.key, cmd.direction()),
        shown,
        cmd.format,
    )
}

fn handle_top(config: &Config, cmd: &TopCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let collection = load_collection(&storage)?;

    let k = cmd.k.unwrap_or(config.analytics.top_k);
    let top = top_delays(collection.records(), k)?;
    print_flights(&format!("Top {k} delays"), &top, cmd.format)
}

fn handle_frequent(config: &Config, cmd: &FrequentCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let collection = load_collection(&storage)?;

    let k = cmd.k.unwrap_or(config.analytics.frequent_k);
    let frequent = frequent_delayed_airlines(collection.records(), k)?;

    match cmd.format {
        OutputFormat::Json => {
            let rows: Vec<_> = frequent
                .iter()
                .map(|(airline, count)| serde_json::json!({ "airline": airline, "count": count }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            println!("Frequently delayed airlines (k = {k})");
            println!("====================================");
            if frequent.is_empty() {
                println!("(none)");
            }
            for (airline, count) in &frequent {
                println!("{:<16} {count} high delays", airline.name());
            }
        }
    }
    Ok(())
}

fn handle_estimate(config: &Config, cmd: &EstimateCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let collection = load_collection(&storage)?;

    let flight = collection
        .get(&cmd.id)
        .ok_or_else(|| Error::FlightNotFound { id: cmd.id.clone() })?;
    let estimate = collection.estimate(flight);
    let accuracy = evaluate_accuracy(i64::from(flight.actual_delay), i64::from(estimate));

    match cmd.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "flight": flight,
                "estimated_delay": estimate,
                "accuracy": accuracy,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("Flight:     {} ({})", flight.id, flight.airline);
            println!("Route:      {} -> {}", flight.origin, flight.destination);
            println!("Scheduled:  {}", flight.scheduled_time.to_rfc3339());
            println!("Actual:     {} min", flight.actual_delay);
            println!("Estimated:  {estimate} min");
            println!("Accuracy:   {accuracy:.1}%");
        }
    }
    Ok(())
}

fn handle_report(config: &Config, cmd: &ReportCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let collection = load_collection(&storage)?;
    let metrics = collection.error_metrics();

    if cmd.json {
        let airlines: Vec<_> = collection
            .stats()
            .iter()
            .map(|(airline, stats)| {
                serde_json::json!({
                    "airline": airline,
                    "total": stats.total,
                    "delayed": stats.delayed,
                    "delay_rate": stats.delay_rate(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "flights": collection.len(),
            "mae": metrics.mae,
            "rmse": metrics.rmse,
            "airlines": airlines,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Delay estimate report");
        println!("=====================");
        println!("Flights: {}", collection.len());
        println!("MAE:     {:.2}", metrics.mae);
        println!("RMSE:    {:.2}", metrics.rmse);
        println!();
        for (airline, stats) in collection.stats().iter() {
            println!(
                "{:<16} {:>4} flights, {:>4} delayed ({:.0}%)",
                airline.name(),
                stats.total,
                stats.delayed,
                stats.delay_rate().unwrap_or(0.0) * 100.0
            );
        }
    }
    Ok(())
}

fn handle_info(config: &Config, cmd: &InfoCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if cmd.json {
        let out = serde_json::json!({
            "database_path": storage.path(),
            "total_flights": stats.total_flights,
            "airlines": stats.airlines,
            "origins": stats.origins,
            "destinations": stats.destinations,
            "earliest_scheduled": stats.earliest_scheduled,
            "latest_scheduled": stats.latest_scheduled,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Database:      {}", storage.path().display());
        println!("Total flights: {}", stats.total_flights);
        println!("Airlines:      {}", stats.airlines);
        println!("Origins:       {}", stats.origins);
        println!("Destinations:  {}", stats.destinations);
        if let (Some(first), Some(last)) = (stats.earliest_scheduled, stats.latest_scheduled) {
            println!("Scheduled:     {} .. {}", first.to_rfc3339(), last.to_rfc3339());
        }
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Analytics]");
                println!("  Top k:           {}", config.analytics.top_k);
                println!("  Frequent k:      {}", config.analytics.frequent_k);
                println!("  Display limit:   {}", config.analytics.display_limit);
                println!();
                println!("[Generation]");
                println!("  Batch size:      {}", config.generation.batch_size);
                println!("  Real-time count: {}", config.generation.realtime_count);
                match config.generation.seed {
                    Some(seed) => println!("  Seed:            {seed}"),
                    None => println!("  Seed:            (random)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
