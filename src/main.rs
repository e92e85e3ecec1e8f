use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use jellym3u::cli::{Args, Command};
use jellym3u::{epg, renumber, Config, PlaylistGenerator, RenumberOptions};

async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;

    match args.command {
        Command::Generate { public } => {
            let generator = PlaylistGenerator::new(&config, public)?;
            println!("Fetching channels from {}...", generator.source_server());

            for playlist in generator.generate().await? {
                println!(
                    "Created {} with {} channels ({} URLs)",
                    playlist.path.display(),
                    playlist.channels,
                    playlist.audience.label()
                );
            }
        }
        Command::Renumber {
            input,
            output,
            start,
            keep_extra_attributes,
        } => {
            let input = input.unwrap_or(config.renumber.input);
            let output = output.unwrap_or(config.renumber.output);
            let options = RenumberOptions {
                start: start.unwrap_or(config.renumber.start),
                keep_extra_attributes: keep_extra_attributes || config.renumber.keep_extra_attributes,
                epg_url: config.renumber.epg_url,
            };

            let count = renumber::renumber_file(&input, &output, &options)
                .with_context(|| format!("Failed to renumber {}", input.display()))?;
            if count == 0 {
                println!("Created {} with 0 channels", output.display());
            } else {
                println!(
                    "Created {} with {} channels numbered {} to {}",
                    output.display(),
                    count,
                    options.start,
                    u64::from(options.start) + count as u64 - 1
                );
            }
        }
        Command::Epg { input, output } => {
            let input = input.unwrap_or(config.epg.input);
            let output = output.unwrap_or(config.epg.output);

            let count = epg::generate_file(&input, &output, chrono::Utc::now())
                .with_context(|| format!("Failed to generate EPG from {}", input.display()))?;
            println!("Created {} with {} channels", output.display(), count);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
