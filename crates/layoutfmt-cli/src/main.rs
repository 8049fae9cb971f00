mod cli;
mod commands;

use clap::ArgMatches;
use tracing::Level;

use cli::{CheckParams, DeclareParams, EstimateParams, ParseParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    let Some((name, m)) = matches.subcommand() else {
        unreachable!("clap should have caught this")
    };
    init_tracing(m);

    match name {
        "check" => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        "parse" => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        "declare" => {
            let params = DeclareParams::from_matches(m);
            commands::declare::run(params.into());
        }
        "estimate" => {
            let params = EstimateParams::from_matches(m);
            commands::estimate::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Logs go to stderr so JSON and declarations on stdout stay clean.
fn init_tracing(m: &ArgMatches) {
    let level = match m.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
