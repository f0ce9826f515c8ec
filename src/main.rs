use std::process::ExitCode;
use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use dorolang::Config;
use dorolang::interpreter::evaluator::RuntimeError;

fn main() -> ExitCode {
    let config: Config = Config::parse();

    // RUST_LOG wins unless --verbose is given
    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match dorolang::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Runtime errors are already part of the program's output
            if err.downcast_ref::<RuntimeError>().is_none() {
                eprintln!("Error: {:#}", err);
            }

            ExitCode::FAILURE
        },
    }
}
