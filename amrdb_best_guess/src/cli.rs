use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command};

use utils::{add_log_args, init_log};

use crate::config::*;

fn path_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .value_parser(value_parser!(PathBuf))
        .value_name(value_name)
        .required(true)
        .help(help)
}

fn cli_model() -> Command {
    add_log_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(path_arg(
        "class_table",
        "CLASS_FILE",
        "Tab separated class and sequence title pairs",
    ))
    .arg(path_arg(
        "annotated",
        "ANNOTATED_FILE",
        "Annotations imputed from DIAMOND hits (TSV)",
    ))
    .arg(path_arg(
        "output",
        "OUTPUT_FILE",
        "Output candidate annotation file (CSV)",
    ))
    .arg(path_arg(
        "leftover",
        "LEFTOVER_FILE",
        "Output file for queries without a usable class (TSV)",
    ))
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    let m = cli_model().get_matches();

    init_log(&m);

    debug!("Processing command line options");

    let get_path = |s: &str| {
        m.get_one::<PathBuf>(s)
            .expect("Missing required argument")
            .to_owned()
    };

    Ok(Config::new(
        get_path("class_table"),
        get_path("annotated"),
        get_path("output"),
        get_path("leftover"),
    ))
}
