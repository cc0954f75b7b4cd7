use std::process::exit;

use clap::ArgMatches;
use ldmlib::{Disk, LdmDatabase, SectorDevice};
use tabled::{Table, Tabled};

use crate::exit_codes;

/// `l` entry point: load the database and print one table per disk.
pub(crate) fn subcommand(device_path: &str, _cli_matches: &ArgMatches) {
  let mut device = match SectorDevice::open(device_path, true) {
    Ok(d) => d,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error opening '{}': {}", device_path, e);
      exit(exit_codes::IO_ERR);
    }
  };

  let db = match LdmDatabase::read(&mut device) {
    Ok(db) => db,
    Err(e) => {
      crate::print_usage();
      eprintln!("Error reading LDM database from '{}': {}", device_path, e);
      exit(exit_codes::FORMAT_ERR);
    }
  };

  for disk in db.disks() {
    if disk.name.is_empty() {
      crate::print_usage();
      eprintln!("Error: disk {} has an empty name", disk.id);
      exit(exit_codes::FORMAT_ERR);
    }
    println!("Disk '{}' ({}):", disk.name, disk.id);
    print_partitions(&db, disk);
    println!();
  }
}

#[derive(Tabled)]
struct DisplayPartition {
  id: u64,
  start: u64,
  size_mib: String,
  vol_id: u64,
  #[tabled(rename = "type")]
  vol_type: String,
  #[tabled(rename = "type name")]
  vol_type_name: String,
}

/// Print one disk's partitions as a table
fn print_partitions(db: &LdmDatabase, disk: &Disk) {
  let rows = disk
    .partlist
    .iter()
    .map(|p| {
      let vol = db.volume(p.vol_id).expect("partition volume resolved during read");
      DisplayPartition {
        id: p.id,
        start: p.start,
        size_mib: format!("{:.2}", p.size as f64 / 2048.0),
        vol_id: vol.id,
        vol_type: format!("{:02x}", vol.type_byte),
        vol_type_name: ldmlib::ptype::name(vol.type_byte).to_string(),
      }
    })
    .collect::<Vec<DisplayPartition>>();

  print!("{}", Table::new(rows).with(crate::table_fmt()));
}
