use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config, Handle,
};
use thiserror::Error;

use crate::config::LogConfig;

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

#[derive(Debug, Error)]
#[error("failed to initialize logging: {0}")]
pub struct LogError(String);

fn log_error(err: impl ToString) -> LogError {
    LogError(err.to_string())
}

pub fn build_config(config: &LogConfig) -> Result<Config, LogError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let mut builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(config.level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    if let Some(file_path) = &config.file_path {
        let archive_pattern = config
            .archive_pattern
            .clone()
            .unwrap_or_else(|| format!("{}.{{}}.gz", file_path.display()));

        let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
        let roller = FixedWindowRoller::builder()
            .build(&archive_pattern, LOG_FILE_COUNT)
            .map_err(log_error)?;
        let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

        let logfile = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(file_path, Box::new(policy))
            .map_err(log_error)?;

        builder = builder.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug.max(config.level))))
                .build("logfile", Box::new(logfile)),
        );
        root = root.appender("logfile");
    }

    builder
        // hyper and rustls are chatty at debug level
        .logger(Logger::builder().build("hyper", LevelFilter::Info))
        .logger(Logger::builder().build("rustls", LevelFilter::Info))
        .build(root.build(LevelFilter::Trace))
        .map_err(log_error)
}

pub fn init(config: &LogConfig) -> Result<Handle, LogError> {
    log4rs::init_config(build_config(config)?).map_err(log_error)
}
