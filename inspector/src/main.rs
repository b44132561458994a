// Project lints
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unsafe_code)]

use crate::commands::Cli;
use crate::config::Config;
use crate::context::Context;
use clap::Parser;

fn main() {
    let command = Cli::parse().command;

    // Reading config
    let config = match Config::from_file() {
        Ok(value) => value,
        Err(err) => {
            let mut message = format!("Config initialization failed. Error: {err}.");
            if let Some(additional_info) = err.additional_info() {
                message.push_str(&format!(" Additional_info: {additional_info}"));
            }
            eprintln!("{}", message);
            std::process::exit(1);
        },
    };

    // Logging setup
    logging::setup(&config).unwrap_or_else(|err| {
        let mut message = format!("Logger initialization failed. Error: {err}.");
        if let Some(additional_info) = err.additional_info() {
            message.push_str(&format!(" Additional_info: {additional_info}"));
        }
        eprintln!("{}", message);
        std::process::exit(1);
    });

    log::debug!("Config loaded: {:#?}", config);

    let mut context = Context::new(config);
    if let Err(err) = command.execute(&mut context) {
        let mut message = err.to_string();
        if let Some(additional_info) = err.additional_info() {
            message.push_str(&format!(" Additional_info: {additional_info}"));
        }
        log::error!("{}", message);
        std::process::exit(1);
    }
}

mod capture;
mod commands;
mod config;
mod context;
mod craft;
mod logging;
mod net;
