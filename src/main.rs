use clap::Parser;
use holehe_checker::core::render::render_report;
use holehe_checker::domain::ports::ConfigProvider;
use holehe_checker::utils::error::ErrorSeverity;
use holehe_checker::utils::logger;
use holehe_checker::{CheckEngine, CliConfig, HolehePipeline, LocalStorage, ProcessRunner};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting holehe-checker");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let request = config.request();
    if request.email.is_empty() {
        eprintln!("⚠️ Please enter an email address.");
        std::process::exit(2);
    }

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output_path().to_string());
    let pipeline = HolehePipeline::new(ProcessRunner::new(), storage, settings);
    let engine = CheckEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run(&request) {
        Ok((report, stored)) => {
            let output_path = engine.pipeline().config().output_path();
            if config.json {
                let mut view = report.to_json();
                view["output_path"] = serde_json::json!(output_path);
                view["downloads"] = serde_json::json!(stored);
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", render_report(&report)?);
                println!("### Downloads ({}):", output_path);
                for name in stored {
                    println!("📥 {}", name);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Check failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
