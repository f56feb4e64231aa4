use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command};

use utils::{add_log_args, init_log};

use crate::config::*;

fn cli_model() -> Command {
    add_log_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("output")
            .short('o')
            .long("output-file")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("Set output file [default: <stdout>]"),
    )
    .arg(
        Arg::new("uc_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("UC_FILE")
            .required(true)
            .help("Cluster output from usearch (-uc)"),
    )
    .arg(
        Arg::new("annotations")
            .value_parser(value_parser!(PathBuf))
            .value_name("ANNOTATION_FILE")
            .required(true)
            .help("Database annotation file (CSV)"),
    )
}

pub fn handle_cli() -> anyhow::Result<Config> {
    let m = cli_model().get_matches();

    init_log(&m);

    debug!("Processing command line options");

    let get_path = |s: &str| {
        m.get_one::<PathBuf>(s)
            .expect("Missing required argument")
            .to_owned()
    };

    let output = m.get_one::<PathBuf>("output").map(|s| s.to_owned());
    Ok(Config::new(
        get_path("uc_file"),
        get_path("annotations"),
        output,
    ))
}
