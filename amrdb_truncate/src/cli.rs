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

/// Set up definition of command options for clap
fn cli_model() -> Command {
    add_log_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("min_coverage")
            .short('c')
            .long("min-coverage")
            .value_parser(value_parser!(f64))
            .value_name("FRACTION")
            .default_value("0.5")
            .help("Minimum query or target coverage for an alignment to be used"),
    )
    .arg(path_arg(
        "pslx_file",
        "PSLX_FILE",
        "BLAT alignments between database sequences",
    ))
    .arg(path_arg(
        "annotations",
        "ANNOTATION_FILE",
        "Database annotation file (CSV)",
    ))
    .arg(path_arg("sequences", "FASTA_FILE", "Database sequence file"))
    .arg(path_arg(
        "singletons",
        "SINGLETON_FILE",
        "File with singleton headers, one per line (no '>')",
    ))
    .arg(path_arg(
        "annot_output",
        "OUTPUT_ANNOTATION_FILE",
        "Output annotation file",
    ))
    .arg(path_arg("seq_output", "OUTPUT_FASTA_FILE", "Output sequence file"))
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
        get_path("pslx_file"),
        get_path("annotations"),
        get_path("sequences"),
        get_path("singletons"),
        get_path("annot_output"),
        get_path("seq_output"),
    );

    let min_cov = *m
        .get_one::<f64>("min_coverage")
        .expect("Missing default min coverage");
    if !(0.0..=1.0).contains(&min_cov) {
        return Err(anyhow!("Minimum coverage {} not between 0 and 1", min_cov));
    }
    cfg.set_min_coverage(min_cov);

    Ok(cfg)
}
