use clap::Parser;
use env_logger::Env;
use envrisk::cli::{Args, OutputFormat};
use envrisk::reporter::TerminalReporter;
use envrisk::{EngineConfig, RiskEngine, RiskError, SignalBundle};
use std::io::Read;
use std::path::Path;

fn read_input(path: Option<&Path>) -> Result<String, RiskError> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|e| RiskError::io(e, Some(path.to_path_buf())))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn init_thread_pool(threads: usize) -> Result<(), RiskError> {
    let thread_count = if threads == 0 { num_cpus::get() } else { threads };
    log::info!("Assessing batch with {} threads", thread_count);

    rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build_global()
        .map_err(|e| RiskError::ThreadPool(e.to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging based on verbosity and quiet flags
    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::debug!("envrisk starting with args: {:?}", args);

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = RiskEngine::new(config)?;

    let input = read_input(args.input.as_deref())?;

    let rendered = if args.batch {
        let bundles: Vec<SignalBundle> = serde_json::from_str(&input)?;
        init_thread_pool(args.threads)?;
        let outcomes = engine.assess_batch(&bundles);

        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        log::info!("Assessed {} bundle(s), {} failed", outcomes.len(), failed);

        match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&outcomes)?,
            OutputFormat::Text => {
                let reporter = TerminalReporter::new();
                let mut out = String::new();
                for outcome in &outcomes {
                    out.push_str(&format!("\n    Bundle #{}\n", outcome.index));
                    match (&outcome.report, &outcome.error) {
                        (Some(report), _) => {
                            out.push_str(&reporter.render(report, Some(&outcome.cache_key)))
                        }
                        (None, Some(err)) => out.push_str(&format!("    ✗ {}\n", err)),
                        (None, None) => {}
                    }
                }
                out
            }
        }
    } else {
        let bundle: SignalBundle = serde_json::from_str(&input)?;
        let report = engine.assess(&bundle)?;
        log::info!(
            "Overall score {:.2} ({})",
            report.overall_score,
            report.overall_risk_level
        );

        match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            OutputFormat::Text => {
                TerminalReporter::new().render(&report, Some(&bundle.cache_key()))
            }
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| RiskError::io(e, Some(path.clone())))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
