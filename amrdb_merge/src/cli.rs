use std::{num::NonZeroUsize, path::PathBuf};

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
        Arg::new("fields")
            .short('n')
            .long("fields")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("6")
            .help("Pad candidate annotations to this number of fields"),
    )
    .arg(path_arg(
        "candidates",
        "CANDIDATE_FILE",
        "Candidate annotations for review (CSV)",
    ))
    .arg(path_arg(
        "sequences",
        "FASTA_FILE",
        "Sequences for the candidate annotations",
    ))
    .arg(path_arg(
        "existing",
        "ANNOTATION_FILE",
        "Existing annotation file (CSV)",
    ))
    .arg(path_arg("seq_output", "OUT_FASTA", "Output FASTA file"))
    .arg(path_arg(
        "annot_output",
        "OUT_ANNOTATION",
        "Output annotation file",
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

    let mut cfg = Config::new(
        get_path("candidates"),
        get_path("sequences"),
        get_path("existing"),
        get_path("seq_output"),
        get_path("annot_output"),
    );

    if let Some(n) = m.get_one::<NonZeroUsize>("fields") {
        cfg.set_n_fields(usize::from(*n))
    }
    Ok(cfg)
}
