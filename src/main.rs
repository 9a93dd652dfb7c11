//! `riffle` command-line entry point.

use std::error::Error;

use clap::{Parser, Subcommand};
use riffle_service::conditions::{FishingConditions, RiverService};
use riffle_service::config::ServiceConfig;
use riffle_service::logging::init_logging;
use riffle_service::report::ShopReport;
use riffle_service::stations::{River, all_river_ids, find_river, validate_registry};
use riffle_service::verify;

/// Live river fishing conditions
#[derive(Parser, Debug)]
#[command(name = "riffle", version, about = "Real-time river fishing conditions")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flow, temperature, weather, and advice for one river
    Conditions {
        /// River identifier, e.g. mckenzie_hayden
        river: String,
        /// Print JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Latest fly-shop fishing report
    Report {
        #[arg(long)]
        json: bool,
    },

    /// List configured rivers
    Rivers,

    /// Check every configured feed against the live services
    Verify {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = ServiceConfig::from_env()?;
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_logging(level, config.log_file.as_deref());

    validate_registry()?;
    let service = RiverService::new(config)?;

    match cli.command {
        Command::Conditions { river, json } => {
            if find_river(&river).is_none() {
                eprintln!("note: '{}' is not a configured river (known: {})", river, all_river_ids().join(", "));
            }
            let conditions = service.conditions(&river);
            if json {
                println!("{}", serde_json::to_string_pretty(&conditions)?);
            } else {
                print_conditions(&conditions);
            }
        }
        Command::Report { json } => {
            let report = service.shop_report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Rivers => {
            for river in River::ALL {
                let p = river.profile();
                println!("{:<18} {} ({:.3}, {:.3})", p.id, p.name, p.latitude, p.longitude);
            }
        }
        Command::Verify { json } => {
            let report = verify::run_full_verification(service.aggregator());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                verify::print_summary(&report);
            }
        }
    }

    Ok(())
}

fn print_conditions(c: &FishingConditions) {
    let r = &c.record;
    println!("🎣 {}", r.river_id);
    match r.current_flow_cfs {
        Some(flow) => {
            let status = r.flow_status.map(|s| s.to_string()).unwrap_or_else(|| "unclassified".to_string());
            println!("   Flow:        {:.0} cfs ({})", flow, status);
        }
        None => println!("   Flow:        unavailable"),
    }
    if let Some(t) = &r.thresholds {
        println!(
            "   Thresholds:  low <{:.0}, optimal {:.0}-{:.0}, high >{:.0}",
            t.low, t.optimal_low, t.optimal_high, t.high
        );
    }
    match r.current_temp_f {
        Some(temp) => println!("   Water temp:  {:.0}°F", temp),
        None => println!("   Water temp:  unavailable"),
    }
    match (c.weather.air_temp_f, c.weather.wind_mph) {
        (Some(air), Some(wind)) => println!("   Weather:     {:.0}°F, {}, wind {:.1} mph", air, c.weather.conditions, wind),
        (Some(air), None) => println!("   Weather:     {:.0}°F, {}", air, c.weather.conditions),
        _ => println!("   Weather:     {}", c.weather.conditions),
    }
    println!("   Species:     {}", c.species.join(", "));
    println!("   Method:      {}", c.recommendation.method);
    println!("   Flies:       {}", c.recommendation.flies.join(", "));
    println!("   Tip:         {}", c.recommendation.tip);
}

fn print_report(report: &ShopReport) {
    match report {
        ShopReport::Found { url, summary, highlights, .. } => {
            println!("📰 {}", url);
            println!();
            println!("{}", summary);
            if !highlights.is_empty() {
                println!();
                for h in highlights {
                    println!("  • {}", h);
                }
            }
        }
        ShopReport::NotFound { message, .. } => println!("{}", message),
    }
}
