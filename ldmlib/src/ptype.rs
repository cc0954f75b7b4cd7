//! Partition-type byte to human-readable name lookup.
//!
//! LDM volumes carry a plain MBR partition-type id in their type byte (the
//! field exists mainly so the device still looks sane to a BIOS/legacy
//! bootloader scanning the partition table). This is the standard table of
//! well-known ids.

/// Look up the conventional name for an MBR partition-type byte. Unknown
/// values return `"Unknown"` rather than failing (an unrecognized type is
/// not a decode error, just an unfamiliar one).
pub fn name(type_byte: u8) -> &'static str {
  match type_byte {
    0x00 => "Empty",
    0x01 => "FAT12",
    0x04 => "FAT16 <32M",
    0x05 => "Extended",
    0x06 => "FAT16",
    0x07 => "NTFS / exFAT",
    0x0b => "FAT32",
    0x0c => "FAT32 (LBA)",
    0x0e => "FAT16 (LBA)",
    0x0f => "Extended (LBA)",
    0x11 => "Hidden FAT12",
    0x14 => "Hidden FAT16 <32M",
    0x16 => "Hidden FAT16",
    0x17 => "Hidden NTFS",
    0x1b => "Hidden FAT32",
    0x1c => "Hidden FAT32 (LBA)",
    0x1e => "Hidden FAT16 (LBA)",
    0x42 => "Windows LDM (dynamic volume)",
    0x82 => "Linux swap",
    0x83 => "Linux",
    0x8e => "Linux LVM",
    0xa5 => "FreeBSD",
    0xa6 => "OpenBSD",
    0xa8 => "Mac OS X",
    0xaf => "Mac OS X HFS+",
    0xee => "GPT protective MBR",
    0xef => "EFI system partition",
    _ => "Unknown",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_type_resolves() {
    assert_eq!(name(0x07), "NTFS / exFAT");
    assert_eq!(name(0x42), "Windows LDM (dynamic volume)");
  }

  #[test]
  fn unknown_type_falls_back() {
    assert_eq!(name(0xd0), "Unknown");
  }
}
