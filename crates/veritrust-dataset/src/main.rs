use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veritrust_classifiers::{load_classifier, ModelConfig};
use veritrust_dataset::cli::{Cli, Commands};
use veritrust_dataset::{evaluate, select_holdout, HoldoutOptions, ReviewDataset, ValidationReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            data,
            json,
            verbose,
        } => {
            init_logging(verbose);

            let dataset = ReviewDataset::load(&data.dataset, &data.selection())?;
            let report = ValidationReport::build(&dataset);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }

        Commands::Evaluate {
            data,
            model_path,
            max_length,
            test_size,
            seed,
            all,
            limit,
            json,
            verbose,
        } => {
            init_logging(verbose);

            let dataset = ReviewDataset::load(&data.dataset, &data.selection())?;
            let reviews = dataset.labeled_reviews()?;
            let holdout = select_holdout(
                reviews,
                &HoldoutOptions {
                    test_size,
                    seed,
                    all,
                    limit,
                },
            )?;
            if holdout.is_empty() {
                warn!("Nothing to evaluate");
                return Ok(());
            }

            let model_config = ModelConfig::from_local(model_path.clone()).with_max_length(max_length);
            info!("Loading model from {}", model_config.location());
            let classifier = load_classifier(&model_config)
                .with_context(|| format!("failed to load model from {}", model_path.display()))?;

            let report = evaluate(classifier.as_ref(), &holdout).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "veritrust_dataset=debug,veritrust_classifiers=debug"
    } else {
        "veritrust_dataset=info,veritrust_classifiers=info"
    };

    // Reports go to stdout; keep logs on stderr so `--json` output stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
