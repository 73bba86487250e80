//! Baker GC CLI
//!
//! Entry point for the collector driver. Parses CLI arguments, then either
//! runs a workload or starts the register REPL.

use clap::Parser as ClapParser;
use lisp_cli::{repl, Cli, CliResult, RunReport, Runtime};
use memory_manager::HeapMap;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = cli.gc_config();
    let mut runtime = Runtime::new(config.clone())?.with_heap_map(cli.heap_map);

    if cli.repl {
        return repl::run_repl(&mut runtime);
    }

    if cli.heap_map {
        println!("{}", HeapMap::LEGEND);
        println!("{}", runtime.collector().heap_map());
    }

    let output = runtime.run(&cli.workload())?;
    println!("{}", output);

    if let Some(path) = &cli.stats_json {
        RunReport::new(&config, output, runtime.stats()).write_to(path)?;
    }
    Ok(())
}
