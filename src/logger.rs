//! Logging setup: the `log` facade over a `log4rs` backend, one config for
//! console output and one for a per-run log file.

use std::path::Path;

/// Initializes console logging at `Info` level. Safe to call more than once;
/// later calls are no-ops once a logger is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    use log::LevelFilter;
    use log4rs::append::console::ConsoleAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let encoder = Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}"));
    let console = ConsoleAppender::builder().encoder(encoder).build();
    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(LevelFilter::Info))?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Scopes a log file next to the container being built:
/// `{base}/{stem}_logs/streamdb.log`.
pub fn init_for(base: &Path, stem: &str) -> Result<(), Box<dyn std::error::Error>> {
    use log::LevelFilter;
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;
    use std::fs;

    let log_dir = base.join(format!("{stem}_logs"));
    fs::create_dir_all(&log_dir)?;
    let logfile = log_dir.join("streamdb.log");
    let encoder = Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}"));
    let file_appender = FileAppender::builder().encoder(encoder).build(logfile)?;
    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(LevelFilter::Debug))?;
    let _ = log4rs::init_config(config);
    Ok(())
}
