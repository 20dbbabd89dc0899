use clap::Parser;
use shipment_times::utils::error::ErrorSeverity;
use shipment_times::utils::{logger, validation::Validate};
use shipment_times::{CliConfig, EtlEngine, LocalStorage, ShipmentPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting shipment-times CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let input = match tokio::fs::read(&cli.input).await {
        Ok(input) => input,
        Err(e) => {
            eprintln!("❌ Failed to read '{}': {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ShipmentPipeline::new(storage, config, input);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✅ Processed {} orders", report.order_count);
                for file in &report.files {
                    println!("📁 {}", file);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
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
