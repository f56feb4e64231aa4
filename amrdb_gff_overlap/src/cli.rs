use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command};

use utils::{
    add_log_args,
    gff::{GffFilter, DEFAULT_FEATURE_TYPE, DEFAULT_SOURCE},
    init_log,
};

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
        Arg::new("source")
            .short('s')
            .long("source")
            .value_parser(value_parser!(String))
            .value_name("STRING")
            .default_value(DEFAULT_SOURCE)
            .help("Source (column 2) of GFF features to use"),
    )
    .arg(
        Arg::new("feature_type")
            .short('f')
            .long("feature-type")
            .value_parser(value_parser!(String))
            .value_name("STRING")
            .default_value(DEFAULT_FEATURE_TYPE)
            .help("Type (column 3) of GFF features to use"),
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
            .help("BLAT alignments of database genes against the reference genome"),
    )
    .arg(
        Arg::new("annotations")
            .value_parser(value_parser!(PathBuf))
            .value_name("ANNOTATION_FILE")
            .required(true)
            .help("Database annotation file (CSV)"),
    )
    .arg(
        Arg::new("gff_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("GFF_FILE")
            .required(true)
            .help("GFF3 annotation of the reference genome"),
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

    let filter = GffFilter::new(
        m.get_one::<String>("source")
            .expect("Missing default source")
            .as_str(),
        m.get_one::<String>("feature_type")
            .expect("Missing default feature type")
            .as_str(),
    );

    let output = m.get_one::<PathBuf>("output").map(|s| s.to_owned());

    Ok(Config::new(
        get_path("pslx_file"),
        get_path("annotations"),
        get_path("gff_file"),
        filter,
        output,
    ))
}
