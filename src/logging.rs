// Logging setup for codeglyph
//
// Log records go to stderr so that `--json` output on stdout stays clean.
// Verbosity comes from `-v` flags; RUST_LOG, when set, overrides it.

use chrono::Local;
use log::LevelFilter;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonLogEntry<'a> {
    timestamp: String,
    level: &'a str,
    target: &'a str,
    message: String,
}

pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn init(verbosity: u8, format: LogFormat) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for(verbosity)).parse_default_env();

    match format {
        LogFormat::Text => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    timestamp(),
                    record.level().as_str(),
                    record.args()
                )
            });
        }
        LogFormat::Json => {
            builder.format(|buf, record| {
                let entry = JsonLogEntry {
                    timestamp: timestamp(),
                    level: record.level().as_str(),
                    target: record.target(),
                    message: record.args().to_string(),
                };
                match serde_json::to_string(&entry) {
                    Ok(line) => writeln!(buf, "{line}"),
                    Err(_) => writeln!(buf, "{} [{}] {}", entry.timestamp, entry.level, entry.message),
                }
            });
        }
    }

    // a second init (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}
