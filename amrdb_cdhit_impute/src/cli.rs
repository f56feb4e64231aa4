use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{add_log_args, init_log};

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
        Arg::new("fields")
            .short('n')
            .long("fields")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("3")
            .help("Number of leading annotation fields to impute"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Separate clusters with blank lines in output and report conflicts to stdout"),
    )
    .arg(
        Arg::new("clstr_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("CLSTR_FILE")
            .required(true)
            .help("Cluster file from cd-hit"),
    )
    .arg(
        Arg::new("annotations")
            .value_parser(value_parser!(PathBuf))
            .value_name("ANNOTATION_FILE")
            .required(true)
            .help("Database annotation file (CSV)"),
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

    let mut cfg = Config::new(
        get_path("clstr_file"),
        get_path("annotations"),
        get_path("output"),
    );

    if let Some(n) = m.get_one::<NonZeroUsize>("fields") {
        cfg.set_n_fields(usize::from(*n))
    }
    if m.get_flag("verbose") {
        cfg.set_verbose()
    }

    Ok(cfg)
}
