use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{add_log_args, init_log, merge::Preference};

use crate::config::*;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    add_log_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("report")
            .short('r')
            .long("report")
            .action(ArgAction::SetTrue)
            .help("Write duplicated entries to stdout and leave them out of the output file"),
    )
    .arg(
        Arg::new("prefer")
            .short('p')
            .long("prefer")
            .value_parser(value_parser!(Preference))
            .ignore_case(true)
            .value_name("first|last|none")
            .default_value("last")
            .help("Which of several equally complete entries to keep (none leaves them out)"),
    )
    .arg(
        Arg::new("input")
            .value_parser(value_parser!(PathBuf))
            .value_name("INPUT_FILE")
            .required(true)
            .help("Annotation file (CSV with header line) containing duplicate entries"),
    )
    .arg(
        Arg::new("output")
            .value_parser(value_parser!(PathBuf))
            .value_name("OUTPUT_FILE")
            .required(true)
            .help("Output annotation file"),
    )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let get_path = |s: &str| {
        m.get_one::<PathBuf>(s)
            .expect("Missing required argument")
            .to_owned()
    };

    let prefer = *m
        .get_one::<Preference>("prefer")
        .expect("Missing default preference");

    let mut cfg = Config::new(get_path("input"), get_path("output"), prefer);
    if m.get_flag("report") {
        cfg.set_report_only()
    }
    Ok(cfg)
}
