use log::LevelFilter;

fn syslog_logger() -> Result<syslog::BasicLogger, String> {
    let formatter = syslog::Formatter3164 {
        facility: syslog::Facility::LOG_MAIL,
        hostname: None,
        process: "autoreply".into(),
        pid: std::process::id(),
    };
    let logger = syslog::unix(formatter).map_err(|e| e.to_string())?;
    Ok(syslog::BasicLogger::new(logger))
}

/// Sends log records to the local syslog daemon, or to stderr when no
/// syslog socket is available. Nothing is ever written to stdout.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    let syslog_err = match syslog_logger() {
        Ok(logger) => match log::set_boxed_logger(Box::new(logger)) {
            Ok(_) => {
                log::set_max_level(level);
                return;
            }
            Err(e) => e.to_string(),
        },
        Err(e) => e,
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_ok() {
        warn!("syslog unavailable ({}), logging to stderr", syslog_err);
    }
}
