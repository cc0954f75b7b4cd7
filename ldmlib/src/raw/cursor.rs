//! Decoding of the variable-length VBLK payload that follows the fixed
//! 16-byte VBLK header.
//!
//! The payload is a stream of fields, some raw fixed-width, some
//! length-prefixed (`num`/`str`), whose shape depends on `recordtype`. None
//! of this is representable as a static `deku` layout, so it is walked by
//! hand with an explicit, bounds-checked cursor.

use super::RawVblkHeader;

/// Component linking a partition to a volume.
pub const RT_COMPONENT: u8 = 0x32;
/// A region of a disk belonging to a volume (by way of a component).
pub const RT_PARTITION: u8 = 0x33;
/// Logical volume.
pub const RT_VOLUME: u8 = 0x51;
/// Physical disk, variant 1.
pub const RT_DISK1: u8 = 0x34;
/// Physical disk, variant 2.
pub const RT_DISK2: u8 = 0x44;

/// Record-type-specific payload of a decoded VBLK.
#[derive(Debug)]
pub(crate) enum RawVblkPayload {
  Component { parentid: u64 },
  Partition { start: u64, size: u64, parentid: u64, diskid: u64 },
  Volume { type_at_offset: usize, type_byte: u8 },
  Disk,
}

/// A fully decoded VBLK record.
#[derive(Debug)]
pub(crate) struct RawVblk {
  pub(crate) objectid: u64,
  pub(crate) objname: String,
  pub(crate) payload: RawVblkPayload,
}

/// Bounds-checked byte cursor over one 128-byte VBLK slot.
struct VblkCursor<'a> {
  buf: &'a [u8],
  pos: usize,
}

impl<'a> VblkCursor<'a> {
  fn at(buf: &'a [u8], pos: usize) -> Self {
    Self { buf, pos }
  }

  fn remaining(&self) -> usize {
    self.buf.len().saturating_sub(self.pos)
  }

  fn skip(&mut self, n: usize) -> Option<()> {
    if self.remaining() < n {
      return None;
    }
    self.pos += n;
    Some(())
  }

  fn byte(&mut self) -> Option<u8> {
    let b = *self.buf.get(self.pos)?;
    self.pos += 1;
    Some(b)
  }

  /// Read a raw big-endian unsigned integer of `width` bytes without a
  /// length prefix.
  fn raw_be(&mut self, width: usize) -> Option<u64> {
    if self.remaining() < width {
      return None;
    }
    let mut v: u64 = 0;
    for &b in &self.buf[self.pos..self.pos + width] {
      v = (v << 8) | b as u64;
    }
    self.pos += width;
    Some(v)
  }

  /// Length-prefixed big-endian integer: one length byte, then that many
  /// big-endian bytes.
  fn num(&mut self) -> Option<u64> {
    let len = self.byte()? as usize;
    if self.remaining() < len {
      return None;
    }
    let mut v: u64 = 0;
    for &b in &self.buf[self.pos..self.pos + len] {
      v = (v << 8) | b as u64;
    }
    self.pos += len;
    Some(v)
  }

  /// Length-prefixed string: one length byte, then up to
  /// `min(len, bufsize - 1)` bytes of content (the rest of the declared
  /// length is still skipped, matching the reference `_v_get_str`).
  fn str(&mut self, bufsize: usize) -> Option<String> {
    let len = self.byte()? as usize;
    if self.remaining() < len {
      return None;
    }
    let copy_len = len.min(bufsize.saturating_sub(1));
    let s = String::from_utf8_lossy(&self.buf[self.pos..self.pos + copy_len]).into_owned();
    self.pos += len;
    Some(s)
  }

  fn offset(&self) -> usize {
    self.pos
  }
}

/// Decode the variable payload of a 128-byte VBLK slot whose fixed header
/// has already been validated by the caller. Returns `None` on any decode
/// failure (an unknown `recordtype`, a buffer that runs out before a field
/// can be read, and so on); all of these collapse to the same "skip this
/// record" signal, per the format's forward-compatibility policy.
pub(crate) fn decode_payload(slot: &[u8]) -> Option<RawVblk> {
  let mut c = VblkCursor::at(slot, RawVblkHeader::SIZE);

  let recordtype = (c.raw_be(4)? & 0xff) as u8;
  c.skip(4)?;

  let objectid = c.num()?;
  let objname = c.str(32)?;

  let payload = match recordtype {
    RT_COMPONENT => {
      c.skip(c.peek_field_size()?)?;
      c.skip(23)?;
      let parentid = c.num()?;
      RawVblkPayload::Component { parentid }
    }

    RT_PARTITION => {
      c.skip(12)?;
      let start = c.raw_be(8)?;
      let _offset = c.raw_be(8)?;
      let size = c.num()?;
      let parentid = c.num()?;
      let diskid = c.num()?;
      RawVblkPayload::Partition { start, size, parentid, diskid }
    }

    RT_VOLUME => {
      c.skip(c.peek_field_size()?)?;
      c.skip(1 + 14 + 25)?;
      c.skip(c.peek_field_size()?)?;
      c.skip(4)?;
      let type_at_offset = c.offset();
      let type_byte = c.byte()?;
      c.skip(16)?;
      c.skip(c.peek_field_size()?)?;
      RawVblkPayload::Volume { type_at_offset, type_byte }
    }

    RT_DISK1 | RT_DISK2 => RawVblkPayload::Disk,

    _ => return None,
  };

  Some(RawVblk { objectid, objname, payload })
}

impl<'a> VblkCursor<'a> {
  /// Size in bytes (length prefix included) of the length-prefixed field at
  /// the current position, without consuming it.
  fn peek_field_size(&self) -> Option<usize> {
    Some(*self.buf.get(self.pos)? as usize + 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blank_slot() -> Vec<u8> {
    vec![0u8; 128]
  }

  #[test]
  fn partition_layout_decodes() {
    let mut slot = blank_slot();
    let mut pos = RawVblkHeader::SIZE;

    // recordtype (low byte of big-endian u32) + 4 skipped bytes
    slot[pos + 3] = RT_PARTITION;
    pos += 8;

    // objectid = num(): length-prefixed
    slot[pos] = 1;
    slot[pos + 1] = 0x07;
    pos += 2;

    // objname = str(32): zero-length name
    slot[pos] = 0;
    pos += 1;

    // 12 raw skip bytes
    pos += 12;

    // start: raw 8-byte big-endian
    slot[pos + 7] = 100;
    pos += 8;

    // offset: raw 8-byte big-endian (unused by the model)
    pos += 8;

    // size = num()
    slot[pos] = 2;
    slot[pos + 1] = 0x00;
    slot[pos + 2] = 0xC8; // 200
    pos += 3;

    // parentid = num()
    slot[pos] = 1;
    slot[pos + 1] = 0x09;
    pos += 2;

    // diskid = num()
    slot[pos] = 1;
    slot[pos + 1] = 0x01;

    let decoded = decode_payload(&slot).expect("partition should decode");
    assert_eq!(decoded.objectid, 0x07);
    match decoded.payload {
      RawVblkPayload::Partition { start, size, parentid, diskid } => {
        assert_eq!(start, 100);
        assert_eq!(size, 200);
        assert_eq!(parentid, 0x09);
        assert_eq!(diskid, 0x01);
      }
      other => panic!("wrong payload: {:?}", other),
    }
  }

  #[test]
  fn unknown_recordtype_is_none() {
    let mut slot = blank_slot();
    slot[RawVblkHeader::SIZE + 3] = 0xFF;
    assert!(decode_payload(&slot).is_none());
  }

  #[test]
  fn truncated_buffer_is_none() {
    let slot = vec![0u8; RawVblkHeader::SIZE + 4];
    assert!(decode_payload(&slot).is_none());
  }
}
