//! # Command-Line Surface
//!
//! Builder-style `clap::Command` construction, kept separate from
//! `main.rs` so the argument grammar can be unit-tested (`get_matches_from`)
//! without touching a process's real argv.

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("imgfs")
        .about("Content-addressed JPEG image filestore")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List imgFS content")
                .arg(Arg::new("store").required(true)),
        )
        .subcommand(
            Command::new("create")
                .about("Create a new imgFS")
                .arg(Arg::new("store").required(true))
                .arg(
                    Arg::new("max_files")
                        .long("max_files")
                        .num_args(1)
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("thumb_res")
                        .long("thumb_res")
                        .num_args(2)
                        .value_names(["X_RES", "Y_RES"])
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("small_res")
                        .long("small_res")
                        .num_args(2)
                        .value_names(["X_RES", "Y_RES"])
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("read")
                .about("Read an image from the imgFS and save it to a file")
                .arg(Arg::new("store").required(true))
                .arg(Arg::new("img_id").required(true))
                .arg(
                    Arg::new("resolution")
                        .default_value("original")
                        .value_parser(["original", "orig", "thumbnail", "thumb", "small"]),
                ),
        )
        .subcommand(
            Command::new("insert")
                .about("Insert a new image into the imgFS")
                .arg(Arg::new("store").required(true))
                .arg(Arg::new("img_id").required(true))
                .arg(Arg::new("filename").required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an image from the imgFS")
                .arg(Arg::new("store").required(true))
                .arg(Arg::new("img_id").required(true)),
        )
        .subcommand(Command::new("help").about("Display usage").arg(Arg::new("_unused").action(ArgAction::SetTrue).hide(true)))
}
