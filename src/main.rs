//! OpenAPI from routes - command-line tool for generating OpenAPI documentation.
//!
//! Reads a directory of functional router definitions (YAML or JSON), flattens every
//! router into route descriptors, and writes an OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <ROUTES_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-routes ./routes -o openapi.yaml
//! ```
//!
//! Document only the public API as JSON:
//! ```bash
//! openapi-from-routes ./routes -f json --group public --paths-to-exclude '/internal/**'
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-routes ./routes -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from routes starting...");

    // Validation logs, so it runs after the logger is up
    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
