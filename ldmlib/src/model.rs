//! The assembly engine: drives `SectorDevice` and `raw` decoding to build the
//! disks/partitions/volumes graph, and exposes the read-only dump and the
//! single targeted mutation this format supports.

use std::collections::HashMap;
use std::io::Write as _;

use deku::prelude::*;

use crate::device::SectorDevice;
use crate::ptype;
use crate::raw::cursor::{self, RawVblkPayload};
use crate::raw::{RawPrivHead, RawTocBlock, RawVblkHeader, RawVmdb};
use crate::LdmError;

const VBLK_SIZE: usize = 128;

/// A physical disk within the disk group.
#[derive(Debug)]
pub struct Disk {
  pub id: u64,
  pub name: String,
  pub partlist: Vec<Partition>,
}

/// A region on a `Disk` belonging to a `Volume`.
#[derive(Debug)]
pub struct Partition {
  pub id: u64,
  pub p_id: u64,
  pub start: u64,
  pub size: u64,
  pub vol_id: u64,
}

/// A logical volume, plus the exact on-disk location of its type byte.
#[derive(Debug)]
pub struct Volume {
  pub id: u64,
  pub type_byte: u8,
  pub toffset: usize,
  pub vblk_sect: u64,
  pub vblk_subsect: u64,
}

/// The assembled LDM metadata model for one dynamic-disk database.
pub struct LdmDatabase {
  disks: HashMap<u64, Disk>,
  volumes: HashMap<u64, Volume>,
}

impl LdmDatabase {
  /// Locate and parse PRIVHEAD/TOCBLOCK/VMDB/VBLK on `device` and assemble
  /// the disks/partitions/volumes graph. See the crate-level docs for the
  /// exact location algorithm and the guarantees held on success.
  pub fn read(device: &mut SectorDevice) -> Result<Self, LdmError> {
    if device.sector_size() != 512 {
      return Err(LdmError::Format("sector size must be 512".into()));
    }

    let mut sect = vec![0u8; 512];

    device.read(&mut sect, 1, Some(6))?;
    let (_, ph0) =
      RawPrivHead::from_bytes((&sect, 0)).map_err(|_| LdmError::Format("Unable to parse privhead 1".into()))?;

    let db_start = ph0.db_start;
    let disk_start = ph0.disk_start;

    device.read(&mut sect, 1, Some(db_start + 1856))?;
    let (_, ph1) =
      RawPrivHead::from_bytes((&sect, 0)).map_err(|_| LdmError::Format("Unable to parse privhead 2".into()))?;

    device.read(&mut sect, 1, Some(db_start + 2047))?;
    let (_, ph2) =
      RawPrivHead::from_bytes((&sect, 0)).map_err(|_| LdmError::Format("Unable to parse privhead 3".into()))?;

    if ph1.db_start != db_start || ph1.disk_start != disk_start || ph2.db_start != db_start || ph2.disk_start != disk_start
    {
      return Err(LdmError::Format("privhead copies disagree on db_start/disk_start".into()));
    }

    if ph0.ver_major != 2 || ph0.ver_minor != 11 {
      return Err(LdmError::Format("Bad privhead version".into()));
    }
    if ph1.ver_major != ph0.ver_major
      || ph1.ver_minor != ph0.ver_minor
      || ph2.ver_major != ph0.ver_major
      || ph2.ver_minor != ph0.ver_minor
    {
      return Err(LdmError::Format("privhead copies disagree on version".into()));
    }

    device.read(&mut sect, 1, Some(db_start + 1))?;
    let (_, toc) =
      RawTocBlock::from_bytes((&sect, 0)).map_err(|_| LdmError::Format("Unable to parse tocblock".into()))?;

    let vmdb_sector = db_start + toc.bitmap1_start;
    device.read(&mut sect, 1, Some(vmdb_sector))?;
    let (_, vm) = RawVmdb::from_bytes((&sect, 0)).map_err(|_| LdmError::Format("Unable to parse vmdb".into()))?;

    if vm.vblk_size != 128 {
      return Err(LdmError::Format("Illegal VBLK size".into()));
    }

    let mut disks: HashMap<u64, Disk> = HashMap::new();
    let mut volumes: HashMap<u64, Volume> = HashMap::new();
    let mut compmap: HashMap<u64, u64> = HashMap::new();

    // `s` tracks the absolute sector most recently read for the current
    // group of 4 VBLK slots; it starts at the VMDB's own sector and is
    // bumped right before the sequential read for each new group, so the
    // value recorded on a Volume is exactly the sector that was just read.
    let mut s = vmdb_sector;
    for i in 0..vm.seqlast as u64 {
      if i % 4 == 0 {
        s += 1;
        device.read(&mut sect, 1, None)?;
      }

      let slot_off = (i % 4) as usize * VBLK_SIZE;
      let slot = &sect[slot_off..slot_off + VBLK_SIZE];

      let header = match RawVblkHeader::from_bytes((slot, 0)) {
        Ok((_, h)) => h,
        Err(_) => continue,
      };
      if header.record != 0 {
        continue;
      }

      let decoded = match cursor::decode_payload(slot) {
        Some(d) => d,
        None => continue,
      };

      match decoded.payload {
        RawVblkPayload::Component { parentid } => {
          compmap.insert(decoded.objectid, parentid);
        }

        RawVblkPayload::Disk => {
          disks
            .entry(decoded.objectid)
            .or_insert_with(|| Disk { id: decoded.objectid, name: String::new(), partlist: Vec::new() })
            .name = decoded.objname;
        }

        RawVblkPayload::Partition { start, size, parentid, diskid } => {
          let partition = Partition { id: decoded.objectid, p_id: parentid, start: disk_start + start, size, vol_id: 0 };
          disks
            .entry(diskid)
            .or_insert_with(|| Disk { id: diskid, name: String::new(), partlist: Vec::new() })
            .partlist
            .push(partition);
        }

        RawVblkPayload::Volume { type_at_offset, type_byte } => {
          volumes.insert(
            decoded.objectid,
            Volume { id: decoded.objectid, type_byte, toffset: type_at_offset, vblk_sect: s, vblk_subsect: i % 4 },
          );
        }
      }
    }

    for disk in disks.values_mut() {
      for part in disk.partlist.iter_mut() {
        let vol_id = compmap
          .get(&part.p_id)
          .copied()
          .ok_or_else(|| LdmError::Format(format!("partition {} has no resolvable component", part.id)))?;
        if !volumes.contains_key(&vol_id) {
          return Err(LdmError::Format(format!("partition {} references unknown volume {}", part.id, vol_id)));
        }
        part.vol_id = vol_id;
      }
      disk.partlist.sort_by_key(|p| p.start);
    }

    Ok(Self { disks, volumes })
  }

  /// Disks in the model, ordered by id.
  pub fn disks(&self) -> Vec<&Disk> {
    let mut out: Vec<&Disk> = self.disks.values().collect();
    out.sort_by_key(|d| d.id);
    out
  }

  /// Look up a volume by id.
  pub fn volume(&self, id: u64) -> Option<&Volume> {
    self.volumes.get(&id)
  }

  /// Render a plain-text table of every disk and its partitions. Fails if
  /// any disk's name decoded empty.
  pub fn dump(&self, out: &mut dyn std::io::Write) -> Result<(), LdmError> {
    for disk in self.disks() {
      if disk.name.is_empty() {
        return Err(LdmError::Format(format!("disk {} has empty name", disk.id)));
      }
      writeln!(out, "Disk '{}' ({})", disk.name, disk.id)?;
      for part in &disk.partlist {
        let vol = &self.volumes[&part.vol_id];
        writeln!(
          out,
          "  {:>6}  start={:<10} size={:>9.2}MiB  vol={:<6} type={:02x} ({})",
          part.id,
          part.start,
          part.size as f64 / 2048.0,
          vol.id,
          vol.type_byte,
          ptype::name(vol.type_byte),
        )?;
      }
    }
    Ok(())
  }

  /// Overwrite a single volume's partition-type byte, both on disk and in
  /// the in-memory model. Not transactional: a failure between the read and
  /// the write back leaves that one sector inconsistent.
  pub fn change_volume_type(&mut self, device: &mut SectorDevice, volume_id: u64, new_type: u8) -> Result<(), LdmError> {
    let vol = self.volumes.get(&volume_id).ok_or_else(|| LdmError::Format("Volume id not found".into()))?;
    let sector = vol.vblk_sect;
    let offset = vol.vblk_subsect as usize * VBLK_SIZE + vol.toffset;

    let mut buf = vec![0u8; 512];
    device.read(&mut buf, 1, Some(sector))?;
    buf[offset] = new_type;
    device.write(&buf, 1, Some(sector))?;

    self.volumes.get_mut(&volume_id).unwrap().type_byte = new_type;
    Ok(())
  }
}
