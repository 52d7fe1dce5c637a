use anyhow::{Context, Result};
use log::info;
use std::{
    env, fs,
    io::{self, Read},
    path::PathBuf,
    process,
};
use vellum_config::Config;

mod script;
mod session;

use script::parse_script;
use session::Session;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config file location: {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let mut logger = env_logger::Builder::from_default_env();
    logger.filter_level(log::LevelFilter::Info);
    if let Some(filter) = &config.log_filter {
        logger.parse_filters(filter);
    }
    logger.init();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <document> [script|-]", args[0]);
        eprintln!("Reads the script from stdin when it is '-' or missing.");
        process::exit(1);
    }

    let document_path = config.resolve_document(&PathBuf::from(&args[1]));
    let markup = fs::read_to_string(&document_path)
        .with_context(|| format!("failed to read {}", document_path.display()))?;

    let script = match args.get(2).map(String::as_str) {
        None | Some("-") => {
            let mut script = String::new();
            io::stdin().read_to_string(&mut script)?;
            script
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read script {path}"))?,
    };
    let commands = parse_script(&script)?;

    let mut session = Session::open(&markup, &config)?;
    info!(
        "running {} command(s) against {}",
        commands.len(),
        document_path.display()
    );

    for (line, command) in &commands {
        match session.run(command) {
            Ok(Some(report)) => println!("{report}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error: line {line}: {e:#}");
                process::exit(1);
            }
        }
    }

    info!("finished at version {}", session.document().version());
    println!("{}", session.markup());
    Ok(())
}
