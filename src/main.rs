use clap::Parser;
use rule_coverage::core::report::write_report;
use rule_coverage::utils::{logger, validation::Validate};
use rule_coverage::{CliArgs, CoverageEngine, CoverageError, CoveragePipeline, LocalTree};

fn exit_with(e: &CoverageError) -> ! {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let log_format = if args.log_json {
        logger::LogFormat::Json
    } else {
        logger::LogFormat::Compact
    };
    logger::init_logger(log_format, args.verbose);

    tracing::info!("Starting rule-coverage");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed");
        exit_with(&e);
    }

    tracing::info!("📁 Project root: {}", config.project_root().display());
    let format = config.report.format;

    let pipeline = CoveragePipeline::new(LocalTree::new(), config);
    let engine = CoverageEngine::new(pipeline);

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    if let Err(e) = write_report(&report, format, &mut stdout.lock(), &mut stderr.lock()) {
        exit_with(&e);
    }

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
