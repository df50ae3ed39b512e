use catalog_fetch::core::health;
use catalog_fetch::utils::error::{ClientError, ErrorSeverity};
use catalog_fetch::utils::{logger, validation::Validate};
use catalog_fetch::{CatalogView, CliConfig, FetchConfig, FetchOrchestrator, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting catalog-fetch CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // TOML 設定檔優先於旗標
    let exit_code = if let Some(path) = cli.config.clone() {
        match TomlConfig::from_file(&path) {
            Ok(config) => run(config, &cli).await,
            Err(e) => {
                report_config_error(&e);
                1
            }
        }
    } else {
        run(cli.clone(), &cli).await
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn report_config_error(e: &ClientError) {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

async fn run<C: FetchConfig + Validate>(config: C, cli: &CliConfig) -> i32 {
    // 驗證配置
    if let Err(e) = config.validate() {
        report_config_error(&e);
        return 1;
    }

    // 健康檢查模式：只打 /health 就結束
    if cli.health {
        return match health::check_health(&reqwest::Client::new(), &config).await {
            Ok(report) => {
                println!(
                    "✅ Service is {} (reported at {})",
                    report.status,
                    report.timestamp.to_rfc3339()
                );
                0
            }
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                exit_code_for(e.severity())
            }
        };
    }

    let mut orchestrator = FetchOrchestrator::new(config);
    orchestrator.fetch().await;

    // 使用者要求的單次重試，沒有退避
    if orchestrator.view().error.is_some() && cli.retry {
        orchestrator.retry().await;
    }

    render(orchestrator.view())
}

fn render(view: &CatalogView) -> i32 {
    match &view.error {
        None => {
            println!(
                "✅ Loaded {} products (reported count: {})",
                view.products.len(),
                view.count
            );
            if view.skipped > 0 {
                println!(
                    "🔶 {} element(s) could not be parsed and were skipped",
                    view.skipped
                );
            }
            for product in &view.products {
                println!(
                    "  [{:>4}] {:<30} {:>10.2}  stock {:>5}  {}",
                    product.id, product.name, product.price, product.stock, product.category.name
                );
            }
            0
        }
        Some(failure) => {
            eprintln!("❌ {}", failure.message);
            eprintln!("💡 {}", failure.recovery_suggestion());
            exit_code_for(failure.severity())
        }
    }
}

fn exit_code_for(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 空目錄之類的情況，不算失敗
        ErrorSeverity::Medium => 2,   // 可重試的連線問題
        ErrorSeverity::High => 1,     // 伺服器或回應內容的問題
        ErrorSeverity::Critical => 3, // 配置或系統層級錯誤
    }
}
