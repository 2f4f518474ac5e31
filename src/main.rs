use anyhow::Context;
use clap::Parser;
use star_render::utils::error::ErrorSeverity;
use star_render::utils::{logger, validation::Validate};
use star_render::{CliConfig, LocalStorage, RenderEngine, RenderPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting star-render");
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if settings.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
    }

    let sources = LocalStorage::new("");
    let target = LocalStorage::new(settings.output_dir.clone());
    let pipeline = RenderPipeline::new(sources, target, settings)
        .context("failed to set up the render pipeline")?;

    let engine = RenderEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Rendered {} documents: {} widgets filled, {} skipped",
                summary.documents,
                summary.widgets_applied,
                summary.widgets_skipped
            );
            for output in &summary.outputs {
                tracing::info!("📁 Output saved to: {}", output);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Render failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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
