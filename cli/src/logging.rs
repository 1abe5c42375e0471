use crate::config::LoggingConfig;

pub const LOG_ENV: &str = "SCHEDCENTER_LOG";

/// Resolves the effective level: `SCHEDCENTER_LOG` wins, then each `-v` raises
/// the configured level by one step.
pub fn level_filter(config: &LoggingConfig, verbosity: u8) -> log::LevelFilter {
    let configured = std::env::var(LOG_ENV).unwrap_or_else(|_| config.level.clone());
    let base: log::LevelFilter = configured.parse().unwrap_or(log::LevelFilter::Warn);
    raise(base, verbosity)
}

fn raise(base: log::LevelFilter, steps: u8) -> log::LevelFilter {
    let mut level = base;
    for _ in 0..steps {
        level = match level {
            log::LevelFilter::Off => log::LevelFilter::Error,
            log::LevelFilter::Error => log::LevelFilter::Warn,
            log::LevelFilter::Warn => log::LevelFilter::Info,
            log::LevelFilter::Info => log::LevelFilter::Debug,
            log::LevelFilter::Debug | log::LevelFilter::Trace => log::LevelFilter::Trace,
        };
    }
    level
}

pub fn setup_logging(config: &LoggingConfig, verbosity: u8) -> anyhow::Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level_filter(config, verbosity))
        // Keep the HTTP stack quiet unless tracing.
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr());

    if let Some(path) = &config.output {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
