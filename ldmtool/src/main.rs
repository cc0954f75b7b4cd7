use std::process::exit;

use clap::{App, Arg, SubCommand};
use tabled::Style;

mod commands;
mod exit_codes;

/// Main ldmtool CLI entry point
fn main() {
  // Build the argument tree in code: this crate has no accompanying
  // cli.yaml asset, so the teacher's load_yaml! shortcut doesn't apply.
  let cli_matches = App::new("ldmtool")
    .about("Reads and patches the Windows LDM dynamic-disk database")
    .arg(Arg::with_name("device").help("Block device or disk image").required(true).index(1))
    .subcommand(SubCommand::with_name("l").about("List the LDM database as a table"))
    .subcommand(
      SubCommand::with_name("c")
        .about("Copy the raw partition table and LDM database to another device")
        .arg(Arg::with_name("device2").help("Destination device or image").required(true).index(1)),
    )
    .subcommand(
      SubCommand::with_name("t")
        .about("Patch a volume's partition-type byte")
        .arg(Arg::with_name("volid").help("Volume id, decimal").required(true).index(1))
        .arg(Arg::with_name("type").help("New partition-type byte, hex").required(true).index(2)),
    )
    .get_matches();

  let device_path = cli_matches.value_of("device").unwrap();

  match cli_matches.subcommand_name() {
    Some("l") => commands::list::subcommand(device_path, cli_matches.subcommand_matches("l").unwrap()),
    Some("c") => commands::copy::subcommand(device_path, cli_matches.subcommand_matches("c").unwrap()),
    Some("t") => commands::set_type::subcommand(device_path, cli_matches.subcommand_matches("t").unwrap()),

    // Unimplemented / unknown sub-command
    Some(subcommand_name) => {
      print_usage();
      eprintln!("Error: unimplemented sub-command: {}", subcommand_name);
      exit(exit_codes::CLI_ARG_ERROR);
    }

    // Something strange happened?
    _ => {
      print_usage();
      eprintln!("Error: unimplemented CLI combination: {:?}", &cli_matches);
      exit(exit_codes::CLI_ARG_ERROR);
    }
  }
}

/// Standard table formatting
pub(crate) fn table_fmt() -> Style {
  Style::pseudo_clean()
}

/// Print the usage banner every error path shows before its error summary.
pub(crate) fn print_usage() {
  eprintln!("Usage:");
  eprintln!("  ldmtool DEVICE l");
  eprintln!("  ldmtool DEVICE c DEVICE2");
  eprintln!("  ldmtool DEVICE t VOLID TYPE");
}
