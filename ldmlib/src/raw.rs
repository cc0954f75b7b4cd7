//! Fixed-layout on-disk structures, decoded with `deku`.
//!
//! Every multi-byte field on an LDM disk is big-endian; signatures are
//! checked with deku's `magic` attribute, which makes a signature mismatch
//! surface as an ordinary `DekuError` that callers translate into a
//! decode-failure rather than a fatal error (see `model::LdmDatabase::read`).

use deku::prelude::*;

pub(crate) mod cursor;

/// Root metadata header; three redundant copies exist on every dynamic disk.
#[derive(Debug, DekuRead)]
#[deku(magic = b"PRIVHEAD")]
pub(crate) struct RawPrivHead {
  #[deku(pad_bytes_before = "4", endian = "big")]
  pub(crate) ver_major: u16,
  #[deku(endian = "big")]
  pub(crate) ver_minor: u16,
  #[deku(pad_bytes_before = "32")]
  pub(crate) disk_id: [u8; 64],
  #[deku(pad_bytes_before = "64")]
  pub(crate) dgrp_id: [u8; 64],
  #[deku(pad_bytes_before = "43", endian = "big")]
  pub(crate) disk_start: u64,
  #[deku(endian = "big")]
  pub(crate) disk_size: u64,
  #[deku(endian = "big")]
  pub(crate) db_start: u64,
  #[deku(endian = "big")]
  pub(crate) db_size: u64,
  #[deku(endian = "big")]
  pub(crate) ntocs: u64,
  #[deku(endian = "big")]
  pub(crate) toc_size: u64,
  #[deku(endian = "big")]
  pub(crate) nconfigs: u32,
  #[deku(pad_bytes_before = "4", endian = "big")]
  pub(crate) config_size: u64,
}

/// Table-of-contents entry; this reader only ever consults copy 0.
#[derive(Debug, DekuRead)]
#[deku(magic = b"TOCBLOCK")]
pub(crate) struct RawTocBlock {
  #[deku(pad_bytes_before = "38", endian = "big")]
  pub(crate) bitmap1_start: u64,
}

/// Header of the VBLK table.
#[derive(Debug, DekuRead)]
#[deku(magic = b"VMDB")]
pub(crate) struct RawVmdb {
  #[deku(endian = "big")]
  pub(crate) seqlast: u32,
  #[deku(endian = "big")]
  pub(crate) vblk_size: u32,
  #[deku(pad_bytes_before = "6", endian = "big")]
  pub(crate) v_major: u16,
  #[deku(endian = "big")]
  pub(crate) v_minor: u16,
  #[deku(pad_bytes_before = "31")]
  pub(crate) dg_guid: [u8; 64],
}

/// Common 16-byte header shared by every VBLK record; the remaining 112
/// bytes of the 128-byte slot are handed to `cursor::decode_payload`.
#[derive(Debug, DekuRead)]
#[deku(magic = b"VBLK")]
pub(crate) struct RawVblkHeader {
  #[deku(endian = "big")]
  pub(crate) vmdb_seq: u32,
  #[deku(pad_bytes_before = "4", endian = "big")]
  pub(crate) record: u16,
  #[deku(endian = "big")]
  pub(crate) nrecords: u16,
}

impl RawVblkHeader {
  /// Byte size of the common header, i.e. where the variable payload starts.
  pub(crate) const SIZE: usize = 16;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sector() -> Vec<u8> {
    vec![0u8; 512]
  }

  #[test]
  fn privhead_rejects_bad_signature() {
    let sect = sector();
    let res = RawPrivHead::from_bytes((&sect, 0));
    assert!(res.is_err());
  }
}
