use std::process::exit;

use clap::ArgMatches;
use ldmlib::{LdmDatabase, SectorDevice};

use crate::exit_codes;

/// `t VOLID TYPE` entry point: patch one volume's partition-type byte.
pub(crate) fn subcommand(device_path: &str, cli_matches: &ArgMatches) {
  let volid_str = cli_matches.value_of("volid").unwrap();
  let type_str = cli_matches.value_of("type").unwrap();

  let volid: u64 = match volid_str.parse() {
    Ok(v) => v,
    Err(_) => {
      crate::print_usage();
      eprintln!("Error: VOLID '{}' is not a valid decimal number", volid_str);
      exit(exit_codes::CLI_ARG_ERROR);
    }
  };

  let type_byte = match u8::from_str_radix(type_str.trim_start_matches("0x"), 16) {
    Ok(t) => t,
    Err(_) => {
      crate::print_usage();
      eprintln!("Error: TYPE '{}' is not a valid hex byte", type_str);
      exit(exit_codes::CLI_ARG_ERROR);
    }
  };

  let mut device = match SectorDevice::open(device_path, false) {
    Ok(d) => d,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error opening '{}': {}", device_path, e);
      exit(exit_codes::IO_ERR);
    }
  };

  let mut db = match LdmDatabase::read(&mut device) {
    Ok(db) => db,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error reading LDM database from '{}': {}", device_path, e);
      exit(exit_codes::FORMAT_ERR);
    }
  };

  if let Err(e) = db.change_volume_type(&mut device, volid, type_byte) {
    crate::print_usage();
    eprintln!("Error setting volume {} to type {:02x}: {}", volid, type_byte, e);
    exit(exit_codes::FORMAT_ERR);
  }

  println!("Volume {} type set to {:02x}", volid, type_byte);
}
