mod commands;
mod config;
mod scan;

use clap::Parser;
use color_eyre::Result;
use commands::Commands;
use config::{CliArgs, Config};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = Config::from_args(&args);
    config.init_logging();

    let output = match args.command {
        Commands::Classify { inputs } => commands::classify(&inputs, config.output),

        Commands::Scan { dir, metadata_only } => {
            scan::scan_library(&dir, metadata_only)?.render(config.output)
        }

        Commands::Tempo { values } => commands::TempoReport::new(&values).render(config.output),

        Commands::Loudness { input } => {
            let records = commands::load_loudness_records(&input)?;
            commands::render_loudness(&records, config.output)?
        }
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
