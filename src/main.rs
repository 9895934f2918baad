use clap::Parser;
use property_pricer::config::cli::Command;
use property_pricer::core::engine::parse_batch;
use property_pricer::utils::error::ErrorSeverity;
use property_pricer::utils::{logger, validation::Validate};
use property_pricer::{
    ArtifactCell, BatchEngine, Cli, CsvDataset, LocalStorage, PricingError, PricingPipeline,
    PricingService,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.service_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if cli.json_logs || config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting property-pricer");
    if cli.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.base_dir.clone());
    let cell = ArtifactCell::new(storage.clone(), config.artifact_paths());
    let dataset = CsvDataset::new(storage, config.dataset_path());

    // The model must be loadable before any command runs.
    let pipeline = match PricingPipeline::initialize(&cell, dataset, config.metadata.clone()).await
    {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };
    tracing::info!("Models loaded successfully");

    let outcome = match cli.command {
        Command::Predict(args) => match args.to_request() {
            Ok(request) => pipeline.predict(request).await.map(|r| to_json(&r)),
            Err(e) => Err(e),
        },
        Command::Filter(args) => pipeline.filter(args.to_filter()).await.map(|s| to_json(&s)),
        Command::Info => Ok(to_json(&pipeline.model_info())),
        Command::Batch(args) => {
            let monitor = args.monitor || config.monitoring_enabled();
            match std::fs::read(&args.input)
                .map_err(PricingError::from)
                .and_then(|data| parse_batch(&data))
            {
                Ok(requests) => {
                    let engine = BatchEngine::new_with_monitoring(pipeline, monitor);
                    engine.run(requests).await.map(|r| to_json(&r))
                }
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(json) => {
            println!("{}", json?);
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn exit_with(e: PricingError) -> ! {
    tracing::error!(
        "Request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", e.user_friendly_message());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
