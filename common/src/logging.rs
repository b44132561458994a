use chrono::{Datelike, Local, Timelike};
use log::Record;
use std::fmt::Arguments;
use thiserror::Error;

pub const DEFAULT_FORMAT: &str = "[$Y-$m-$D $H:$M $LEVEL] $MESSAGE";

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO Error.")]
    IOError(#[from] std::io::Error),

    #[error("Logger initialization error.")]
    SetLoggerError(log::SetLoggerError),
}

impl LogError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            LogError::IOError(err) => Some(err.to_string()),
            LogError::SetLoggerError(err) => Some(err.to_string()),
        }
    }
}

/// `<TITLE>_<YYYY-MM-DD>.log`, spaces in the title become dashes.
pub fn generate_file_name(title: &str) -> String {
    let now = Local::now();
    let date = format!(
        "{year:04}-{month:02}-{day:02}",
        year = now.year(),
        month = now.month(),
        day = now.day(),
    );

    let title_formatted = title.trim().replace(" ", "-");
    format!("{title_formatted}_{date}.log")
}

/// Substitutes `$Y $m $D $H $M $S $LEVEL $TARGET $MESSAGE` in the template.
pub fn parse_format(format: &str, message: &Arguments, record: &Record) -> String {
    let time = Local::now();

    let placeholders = [
        ("$Y", format!("{:0>2}", time.year())),
        ("$m", format!("{:0>2}", time.month())),
        ("$D", format!("{:0>2}", time.day())),
        ("$H", format!("{:0>2}", time.hour())),
        ("$M", format!("{:0>2}", time.minute())),
        ("$S", format!("{:0>2}", time.second())),
        ("$LEVEL", record.level().as_str().to_string()),
        ("$TARGET", record.target().to_string()),
    ];
    let substitute = |part: &str| {
        placeholders
            .iter()
            .fold(part.to_string(), |log, (placeholder, value)| {
                log.replace(placeholder, value)
            })
    };

    // "$M" is a prefix of "$MESSAGE", and the message itself is never scanned
    let template = format.trim();
    match template.split_once("$MESSAGE") {
        Some((head, tail)) => {
            format!("{}{}{}", substitute(head), message, substitute(tail))
        },
        None => substitute(template),
    }
}
