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
        Arg::new("min_identity")
            .short('i')
            .long("min-identity")
            .value_parser(value_parser!(f64))
            .value_name("PERCENT")
            .default_value("70")
            .help("Minimum percent identity for a DIAMOND hit to be accepted"),
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
        Arg::new("diamond_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("DIAMOND_FILE")
            .required(true)
            .help("Tab delimited DIAMOND blastx results"),
    )
    .arg(
        Arg::new("blastdbcmd_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("BLASTDBCMD_FILE")
            .required(true)
            .help("blastdbcmd output for the DIAMOND subjects"),
    )
    .arg(
        Arg::new("unannotated_file")
            .value_parser(value_parser!(PathBuf))
            .value_name("UNANNOTATED_FILE")
            .required(true)
            .help("Output file for queries left unannotated"),
    )
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

    let output = m.get_one::<PathBuf>("output").map(|s| s.to_owned());
    let mut cfg = Config::new(
        get_path("diamond_file"),
        get_path("blastdbcmd_file"),
        get_path("unannotated_file"),
        output,
    );

    if let Some(x) = m.get_one::<f64>("min_identity") {
        if !(0.0..=100.0).contains(x) {
            return Err(anyhow!("Minimum identity must be between 0 and 100"));
        }
        cfg.set_min_identity(*x)
    }
    Ok(cfg)
}
