use clap::Parser;
use shelter_etl::app::analysis;
use shelter_etl::utils::error::ErrorSeverity;
use shelter_etl::utils::{logger, validation::Validate};
use shelter_etl::{CliConfig, DatasetExporter, EtlEngine, EtlError, LocalStorage, RunSettings};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            // logger is not up yet; the failure goes straight to stderr
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e).max(1));
        }
    };

    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    tracing::info!("Starting shelter-etl");
    tracing::debug!("Run settings: {:?}", settings);

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&settings).await {
        Ok(written) => {
            tracing::info!("✅ ETL process completed successfully!");
            for path in &written {
                println!("📁 {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }
}

async fn run(settings: &RunSettings) -> Result<Vec<String>, EtlError> {
    let engine = EtlEngine::new_with_monitoring(settings.store.build(), settings.monitor)
        .with_collections(settings.collections.clone());

    let dataset = engine.run(&settings.filters).await?;

    let storage = LocalStorage::new(settings.output_path.as_str());
    let exporter = DatasetExporter::new(storage.clone(), settings.export_options()?);
    let written = exporter
        .export(&dataset)
        .await?
        .into_iter()
        .map(|name| storage.full_path(&name).display().to_string())
        .collect();

    if settings.summary {
        let summary = analysis::summarize(&dataset);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(written)
}

fn exit_code(e: &EtlError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
