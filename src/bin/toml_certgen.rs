use anyhow::Context;
use certgen::config::toml_config::TomlConfig;
use certgen::core::session::PREVIEW_LIMIT;
use certgen::core::{roster, ConfigProvider};
use certgen::utils::{logger, validation::Validate};
use certgen::{CertificatePipeline, GenerationEngine, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-certgen")]
#[command(about = "Certificate generator driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "certgen.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs instead of the compact format
    #[arg(long)]
    log_json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - parse and preview the roster without calling the backend
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based certificate generator");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No certificates will be generated");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = CertificatePipeline::new(storage, config);
    let mut engine = GenerationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Certificate generation completed successfully!");
            println!("✅ Certificate generation completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Certificate generation failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                certgen::utils::error::ErrorSeverity::Low => 0,
                certgen::utils::error::ErrorSeverity::Medium => 2,
                certgen::utils::error::ErrorSeverity::High => 1,
                certgen::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Project: {}", config.project.name);
    if let Some(description) = &config.project.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("📄 Roster: {}", config.roster_path());
    tracing::info!("🖼 Background: {}", config.background_path());
    tracing::info!("🌐 Backend: {}", config.resolved_backend_base());
    tracing::info!("📁 Output: {}", config.output_path());
}

// 只讀取並預覽名冊，不呼叫後端
async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(config.roster_path())
        .await
        .with_context(|| format!("Failed to read roster '{}'", config.roster_path()))?;
    let parsed = roster::parse(&text)?;

    println!("Parsed {} records", parsed.len());
    for record in parsed.preview(PREVIEW_LIMIT) {
        println!(
            "  {} | {} | {}",
            record.student_name, record.course_name, record.date
        );
    }
    if parsed.len() > PREVIEW_LIMIT {
        println!("Showing {} of {} records", PREVIEW_LIMIT, parsed.len());
    }
    println!("Would send each record to {}", config.resolved_backend_base());

    Ok(())
}
