// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};

mod commands;
mod container;
mod error;

fn build_cli() -> Command {
    Command::new("vadpcm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Encode, decode, and measure the vadpcm lossy audio codec")
        .arg(Arg::new("debug").long("debug").help("Raise log verbosity to debug").action(ArgAction::SetTrue))
        .arg(Arg::new("quiet").long("quiet").help("Only log errors").action(ArgAction::SetTrue))
        .subcommand_required(true)
        .subcommand(
            Command::new("encode")
                .about("Encode a PCM file to VADPCM")
                .arg(Arg::new("INPUT").required(true).index(1))
                .arg(Arg::new("OUTPUT").required(true).index(2))
                .arg(
                    Arg::new("predictors")
                        .long("predictors")
                        .value_name("N")
                        .default_value("4")
                        .value_parser(clap::value_parser!(u8)),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode a VADPCM file to PCM")
                .arg(Arg::new("INPUT").required(true).index(1))
                .arg(Arg::new("OUTPUT").required(true).index(2)),
        )
        .subcommand(
            Command::new("stats")
                .about("Report the SNR between a VADPCM file and a PCM reference")
                .arg(Arg::new("INPUT").required(true).index(1))
                .arg(Arg::new("REFERENCE").required(true).index(2)),
        )
        .subcommand(
            Command::new("batch-stats")
                .about("Report SNR for many VADPCM files against adjacent .orig references")
                .arg(Arg::new("INPUT").required(true).num_args(1..))
                .arg(Arg::new("jobs").long("jobs").value_name("N").value_parser(clap::value_parser!(usize))),
        )
}

fn init_logging(matches: &clap::ArgMatches) {
    let mut builder = pretty_env_logger::formatted_builder();
    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    }
    else if matches.get_flag("quiet") {
        log::LevelFilter::Error
    }
    else {
        log::LevelFilter::Warn
    };
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}

fn run() -> error::CliResult<()> {
    let matches = build_cli().get_matches();
    init_logging(&matches);

    match matches.subcommand() {
        Some(("encode", sub)) => {
            let input = PathBuf::from(sub.get_one::<String>("INPUT").unwrap());
            let output = PathBuf::from(sub.get_one::<String>("OUTPUT").unwrap());
            let predictors = *sub.get_one::<u8>("predictors").unwrap();
            commands::run_encode(&input, &output, predictors)
        }
        Some(("decode", sub)) => {
            let input = PathBuf::from(sub.get_one::<String>("INPUT").unwrap());
            let output = PathBuf::from(sub.get_one::<String>("OUTPUT").unwrap());
            commands::run_decode(&input, &output)
        }
        Some(("stats", sub)) => {
            let input = PathBuf::from(sub.get_one::<String>("INPUT").unwrap());
            let reference = PathBuf::from(sub.get_one::<String>("REFERENCE").unwrap());
            let snr = commands::run_stats(&input, &reference)?;
            println!("{:.2} dB", snr);
            Ok(())
        }
        Some(("batch-stats", sub)) => {
            let inputs: Vec<PathBuf> = sub.get_many::<String>("INPUT").unwrap().map(PathBuf::from).collect();
            let jobs = sub.get_one::<usize>("jobs").copied().unwrap_or_else(num_cpus::get);
            commands::run_batch_stats(&inputs, jobs)
        }
        _ => unreachable!("subcommand_required enforces this"),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
