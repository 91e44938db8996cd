//! `imgfs` CLI entry point. Parses argv, dispatches to a `commands::*`
//! function, and maps any error to its stable process exit code.

use imgfs::commands;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = imgfs::cli::build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("list", sub)) => commands::list(sub),
        Some(("create", sub)) => commands::create(sub),
        Some(("read", sub)) => commands::read(sub),
        Some(("insert", sub)) => commands::insert(sub),
        Some(("delete", sub)) => commands::delete(sub),
        Some(("help", _)) => commands::help(),
        _ => commands::help(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
