//! Reader/writer for the on-disk Logical Disk Manager (LDM) database used by
//! Windows dynamic disks: locates the metadata region on a raw device,
//! parses PRIVHEAD/TOCBLOCK/VMDB/VBLK records, and reconstructs the
//! disks/partitions/volumes graph.

use thiserror::Error;

pub mod device;
pub mod model;
pub mod ptype;
pub(crate) mod raw;

pub use device::SectorDevice;
pub use model::{Disk, LdmDatabase, Partition, Volume};

/// Error taxonomy for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum LdmError {
  /// Device open/seek/read/write failure.
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// Signature mismatch, version mismatch, size mismatch, or a broken
  /// cross-reference in the decoded model.
  #[error("format error: {0}")]
  Format(String),
}
