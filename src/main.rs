use anyhow::{Context, Result};
use infection_clusters::analysis::{AnalysisOutcome, run_analysis, run_analysis_on_tables};
use infection_clusters::cli::{Args, Command, help_text};
use infection_clusters::config::AnalysisConfig;
use infection_clusters::reader::async_loader::load_datasets_async;
use infection_clusters::synthetic::{SyntheticConfig, generate_dataset};
use log::info;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AnalysisConfig::from_env().context("Invalid CLUSTER_* environment settings")?;
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config.show_progress = args.progress;
    config.validate().context("Invalid configuration")?;

    let outcome = match args.command {
        Command::Help => {
            println!("{}", help_text());
            return Ok(());
        }
        Command::Version => {
            println!("infection-clusters {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Demo { seed } => {
            info!("Generating synthetic dataset with seed {seed}");
            let dataset = generate_dataset(&SyntheticConfig {
                seed,
                ..SyntheticConfig::default()
            });
            run_analysis(
                Some(&dataset.microbiology),
                Some(&dataset.transfers),
                &config,
            )
        }
        Command::Analyze {
            micro,
            transfers,
            analysis,
        } => {
            config.analysis_type = analysis;
            info!("{config}");
            match load_datasets_async(&micro, &transfers).await {
                Ok((micro_tables, transfer_tables)) => {
                    run_analysis_on_tables(&micro_tables, &transfer_tables, &config)
                }
                Err(e) => AnalysisOutcome::from_error(&e),
            }
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize result")?;
        println!("{json}");
    } else if let Some(report) = &outcome.formatted {
        print!("{report}");
    } else {
        eprintln!("{}", outcome.message);
    }

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
