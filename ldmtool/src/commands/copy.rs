use std::process::exit;

use clap::ArgMatches;
use ldmlib::SectorDevice;

use crate::exit_codes;

/// Partition table + first PRIVHEAD copy occupy the first 7 sectors of the
/// device (sectors 0..6 inclusive).
const HEADER_SECTORS: usize = 7;
/// Size of the raw LDM database region.
const DB_SECTORS: usize = 2048;

/// `c DEVICE2` entry point: copy the raw partition table and the raw LDM
/// database from `device_path` onto `device2`.
pub(crate) fn subcommand(device_path: &str, cli_matches: &ArgMatches) {
  let device2_path = cli_matches.value_of("device2").unwrap();

  let mut src = match SectorDevice::open(device_path, true) {
    Ok(d) => d,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error opening '{}': {}", device_path, e);
      exit(exit_codes::IO_ERR);
    }
  };

  if src.size() < DB_SECTORS as u64 {
    crate::print_usage();
    eprintln!("Error: source device '{}' is smaller than the {}-sector LDM database", device_path, DB_SECTORS);
    exit(exit_codes::FORMAT_ERR);
  }

  let mut dst = match SectorDevice::open(device2_path, false) {
    Ok(d) => d,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error opening '{}': {}", device2_path, e);
      exit(exit_codes::IO_ERR);
    }
  };

  // A zero-length destination gets everything appended starting at sector 0;
  // an existing one has just its trailing DB region overwritten in place.
  let newfile = dst.size() == 0;

  if let Err(e) = copy_sectors(&mut src, &mut dst, HEADER_SECTORS, None, None) {
    crate::print_usage();
    eprintln!("Error copying partition table from '{}' to '{}': {}", device_path, device2_path, e);
    exit(exit_codes::IO_ERR);
  }

  let src_db_start = src.size() - DB_SECTORS as u64;
  let dst_db_start = if newfile {
    None
  } else if dst.size() >= DB_SECTORS as u64 {
    Some(dst.size() - DB_SECTORS as u64)
  } else {
    None
  };

  if let Err(e) = copy_sectors(&mut src, &mut dst, DB_SECTORS, Some(src_db_start), dst_db_start) {
    crate::print_usage();
    eprintln!("Error copying LDM database from '{}' to '{}': {}", device_path, device2_path, e);
    exit(exit_codes::IO_ERR);
  }
}

/// Stream `nsect` sectors from `src` to `dst`, one sector at a time.
fn copy_sectors(
  src: &mut SectorDevice,
  dst: &mut SectorDevice,
  nsect: usize,
  src_pos: Option<u64>,
  dst_pos: Option<u64>,
) -> Result<(), ldmlib::LdmError> {
  if let Some(pos) = src_pos {
    src.set_pos(pos)?;
  }
  if let Some(pos) = dst_pos {
    dst.set_pos(pos)?;
  }

  let mut sect = vec![0u8; 512];
  for _ in 0..nsect {
    src.read(&mut sect, 1, None)?;
    dst.write(&sect, 1, None)?;
  }
  Ok(())
}
