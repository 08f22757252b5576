use clap::Parser;
use product_content_etl::core::ConfigProvider;
use product_content_etl::utils::error::ErrorSeverity;
use product_content_etl::utils::{logger, validation::Validate};
use product_content_etl::{CliConfig, ContentPipeline, EtlEngine, LocalStorage, OpenAiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting product-content-etl");
    tracing::debug!(
        "Flavor: {}, input: {}, output: {}, model: {}",
        config.flavor,
        config.input_path(),
        config.output_path(),
        config.model
    );

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let client = match config.llm_settings().and_then(OpenAiClient::new) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let profile = config.flavor.profile();
    let storage = LocalStorage::current_dir();
    let pipeline = ContentPipeline::new(storage, client, config, profile);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Content generation completed!");
            println!(
                "✅ Wrote {} records to {} ({} rows skipped)",
                report.records_written, report.output_path, report.rows_failed
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Content generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
