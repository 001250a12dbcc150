use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Map the number of `-v` flags to a log level.
pub fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. `RUST_LOG` takes precedence over `verbosity`.
///
/// Calling this more than once keeps the first logger.
pub fn init(verbosity: u8) {
    let result = Builder::new()
        .filter_level(level(verbosity))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("logger was already initialized");
    }
}
