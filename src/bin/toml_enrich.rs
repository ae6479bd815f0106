use clap::Parser;
use tag_enrich::core::ConfigProvider;
use tag_enrich::utils::{logger, validation::Validate};
use tag_enrich::{DellApiClient, EnrichmentPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-enrich")]
#[command(about = "Service-tag enrichment driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "enrich-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Read the input and report what would be looked up, without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.monitoring.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based enrichment");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::current_dir();
    let pipeline = EnrichmentPipeline::with_dell_api(storage, config)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        return perform_dry_run(&pipeline, &args).await;
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Enrichment completed successfully!");
            println!("✅ Enrichment completed successfully!");
            println!("📁 Output saved to: {}", report.output_path);
            println!(
                "📊 Rows: {} read, {} enriched, {} skipped, {} lookup failures",
                report.stats.rows_read,
                report.stats.enriched,
                report.stats.skipped,
                report.stats.lookup_failures
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Enrichment failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

// 憑證只顯示是否已設定
fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Identifier column: {}", config.identifier_column());
    println!("  Auth endpoint: {}", config.auth_url());
    println!("  Entitlements endpoint: {}", config.entitlements_url());
    println!("  Components endpoint: {}", config.components_url());
    match config.request_timeout() {
        Some(timeout) => println!("  Request timeout: {}s", timeout.as_secs()),
        None => println!("  Request timeout: transport default"),
    }
    println!("  Client credentials: configured");

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    pipeline: &EnrichmentPipeline<LocalStorage, TomlConfig, DellApiClient>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = pipeline.plan().await?;

    println!("🔍 Dry Run Analysis:");
    println!("  Rows read: {}", plan.rows_read);
    println!("  Rows to enrich: {}", plan.service_tags.len());
    println!("  Rows to skip: {}", plan.rows_skipped());
    println!("  API calls planned: {}", plan.api_calls());

    if args.verbose {
        for tag in &plan.service_tags {
            println!("    {}", tag);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Nothing was written.");

    Ok(())
}
