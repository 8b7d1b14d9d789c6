//! Entry point for the grouped-reduce application.
//! Handles CLI parsing, payload loading, and dispatches the requested statistic.

use clap::Parser;
use grouped_reduce::cli::Args;
use grouped_reduce::input::result_to_json;
use grouped_reduce::parallel::{get_parallel_info, ParallelConfig};
use grouped_reduce::statistics::{aggregate, statistic_names};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.list_funcs {
        for name in statistic_names() {
            println!("{name}");
        }
        return Ok(());
    }

    ParallelConfig::new(args.threads).setup_global_pool()?;

    let payload = args.payload()?;
    let func = args.func.as_deref().ok_or("--func is required")?;

    if args.verbose {
        get_parallel_info().print_info();
        println!("\n===== Input =====");
        println!("- shape: {:?}", payload.array.shape());
        println!("- dtype: {}", payload.array.dtype());
        println!("- labels: {}", payload.group_idx.len());
        println!("⚡ Computing {func} with the {} engine", args.engine);
    }

    let result = aggregate(
        func,
        &payload.group_idx,
        &payload.array,
        &args.engine,
        &args.reduce_options(),
    )?;

    println!("{}", serde_json::to_string_pretty(&result_to_json(&result))?);

    Ok(())
}
