use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command};

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
        Arg::new("max_gap_bases")
            .short('g')
            .long("max-gap-bases")
            .value_parser(value_parser!(u32))
            .value_name("INT")
            .default_value("100")
            .help("Ignore alignments with more query or target gap bases"),
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
        Arg::new("pslx_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("PSLX_FILE")
            .required(true)
            .help("BLAT alignments of queries against database sequences"),
    )
    .arg(
        Arg::new("annotations")
            .value_parser(value_parser!(PathBuf))
            .value_name("ANNOTATION_FILE")
            .required(true)
            .help("Database annotation file (CSV)"),
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

    let output = m.get_one::<PathBuf>("output").map(|s| s.to_owned());
    let mut cfg = Config::new(get_path("pslx_file"), get_path("annotations"), output);

    if let Some(x) = m.get_one::<u32>("max_gap_bases") {
        cfg.set_max_gap_bases(*x)
    }
    Ok(cfg)
}
