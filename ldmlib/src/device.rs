use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::LdmError;

/// Fixed sector size used throughout the LDM on-disk format.
pub const SECTOR_SIZE: u64 = 512;

/// Sector-addressed read/write access to a block device or disk image.
///
/// Wraps a plain file; all positions are in whole sectors. Partial reads and
/// writes are retried until the requested number of sectors has been moved,
/// matching a raw block device's short-read/short-write behavior.
pub struct SectorDevice {
  file: File,
  size_sectors: u64,
}

impl SectorDevice {
  /// Open a device or image file. `readonly` selects between a read-only and
  /// a read/write handle.
  pub fn open<P: AsRef<Path>>(path: P, readonly: bool) -> Result<Self, LdmError> {
    let file = OpenOptions::new()
      .read(true)
      .write(!readonly)
      .create(!readonly)
      .open(path)?;

    let size_sectors = file.metadata()?.len() / SECTOR_SIZE;

    Ok(Self { file, size_sectors })
  }

  /// Total number of whole sectors in the device.
  pub fn size(&self) -> u64 {
    self.size_sectors
  }

  /// Fixed sector size in bytes (always 512 for this format).
  pub fn sector_size(&self) -> u64 {
    SECTOR_SIZE
  }

  /// Position the cursor at the start of the given absolute sector.
  pub fn set_pos(&mut self, sector: u64) -> Result<(), LdmError> {
    self.file.seek(SeekFrom::Start(sector * SECTOR_SIZE))?;
    Ok(())
  }

  /// Read `nsect` whole sectors into `buf`. If `pos` is given, seeks there
  /// first; otherwise reads from the current cursor. Retries on short reads;
  /// EOF before `nsect*512` bytes have been read is an `Io` error.
  pub fn read(&mut self, buf: &mut [u8], nsect: usize, pos: Option<u64>) -> Result<(), LdmError> {
    if let Some(pos) = pos {
      self.set_pos(pos)?;
    }

    let want = nsect * SECTOR_SIZE as usize;
    let buf = &mut buf[..want];
    let mut filled = 0;
    while filled < want {
      let n = self.file.read(&mut buf[filled..])?;
      if n == 0 {
        return Err(LdmError::Io(std::io::Error::new(
          std::io::ErrorKind::UnexpectedEof,
          "unexpected end of device while reading sectors",
        )));
      }
      filled += n;
    }
    Ok(())
  }

  /// Write `nsect` whole sectors from `buf`. If `pos` is given, seeks there
  /// first; otherwise writes at the current cursor. Retries on short writes.
  pub fn write(&mut self, buf: &[u8], nsect: usize, pos: Option<u64>) -> Result<(), LdmError> {
    if let Some(pos) = pos {
      self.set_pos(pos)?;
    }

    let want = nsect * SECTOR_SIZE as usize;
    let buf = &buf[..want];
    let mut sent = 0;
    while sent < want {
      let n = self.file.write(&buf[sent..])?;
      if n == 0 {
        return Err(LdmError::Io(std::io::Error::new(
          std::io::ErrorKind::WriteZero,
          "failed to write whole sector(s) to device",
        )));
      }
      sent += n;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  /// Build a throwaway image file of the given sector count under the
  /// system temp directory, unique per call within this test process.
  fn temp_image(sectors: u64) -> std::path::PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("ldmlib-test-{}-{}.img", std::process::id(), n));
    let f = File::create(&path).unwrap();
    f.set_len(sectors * SECTOR_SIZE).unwrap();
    path
  }

  #[test]
  fn read_write_round_trip() {
    let path = temp_image(4);
    let mut dev = SectorDevice::open(&path, false).unwrap();
    assert_eq!(dev.size(), 4);
    assert_eq!(dev.sector_size(), 512);

    let src = vec![0xABu8; 512];
    dev.write(&src, 1, Some(2)).unwrap();

    let mut out = vec![0u8; 512];
    dev.read(&mut out, 1, Some(2)).unwrap();
    assert_eq!(out, src);

    std::fs::remove_file(&path).ok();
  }

  #[test]
  fn read_past_end_is_io_error() {
    let path = temp_image(1);
    let mut dev = SectorDevice::open(&path, true).unwrap();
    let mut out = vec![0u8; 512];
    let err = dev.read(&mut out, 2, Some(0));
    assert!(matches!(err, Err(LdmError::Io(_))));

    std::fs::remove_file(&path).ok();
  }
}
