use anyhow::Context;
use clap::Parser;
use entrygate::app::{build_entrypoint, load_settings};
use entrygate::utils::{logger, signal::shutdown_signal, validation::Validate};
use entrygate::{CliConfig, EntrypointError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose, config.log_format);

    tracing::info!("Starting entrygate");

    let settings = match load_settings(&config.overrides(), config.config.as_deref())
        .and_then(|settings| settings.validate().map(|()| settings))
    {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    tracing::debug!("Resolved startup plan: {}", settings.plan());

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be waited on, migrated or executed");
        let plan = serde_json::to_string_pretty(&settings.plan())
            .context("failed to render startup plan")?;
        println!("{}", plan);
        return Ok(());
    }

    let entrypoint = build_entrypoint(&settings, config.monitor);

    // On success the process image has been replaced and this never returns.
    match entrypoint
        .run_with_shutdown(&settings.command, shutdown_signal())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => fail(e),
    }
}

fn fail(e: EntrypointError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    std::process::exit(e.exit_code());
}
