//! Byte-slice helpers for bounds-checked little-endian reads.
//!
//! - **Option layer** (`read_*`): return `Option<T>`, `None` when out of bounds.
//! - **Result layer** (`*_r`): map `None` to `DeserializationError::Truncated`.
//!
//! All numeric reads are little-endian; offsets are relative to the slice passed in.

use crate::err::DeserializationError;

/// Read `N` raw bytes at `offset`.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(read_array::<2>(buf, offset)?))
}

pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_le_bytes(read_array::<4>(buf, offset)?))
}

#[inline]
pub(crate) fn truncated(
    what: &'static str,
    offset: usize,
    need: usize,
    len: usize,
) -> DeserializationError {
    DeserializationError::Truncated {
        what,
        offset: offset as u64,
        need,
        have: len.saturating_sub(offset),
    }
}

pub(crate) fn slice_r<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DeserializationError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))
}

/// Read `N` raw bytes at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_array_r<const N: usize>(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<[u8; N], DeserializationError> {
    read_array::<N>(buf, offset).ok_or_else(|| truncated(what, offset, N, buf.len()))
}

pub(crate) fn read_u8_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u8, DeserializationError> {
    read_u8(buf, offset).ok_or_else(|| truncated(what, offset, 1, buf.len()))
}

pub(crate) fn read_u16_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u16, DeserializationError> {
    read_u16_le(buf, offset).ok_or_else(|| truncated(what, offset, 2, buf.len()))
}

pub(crate) fn read_u32_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u32, DeserializationError> {
    read_u32_le(buf, offset).ok_or_else(|| truncated(what, offset, 4, buf.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05];
        assert_eq!(read_u16_le(&buf, 0), Some(0x0201));
        assert_eq!(read_u32_le(&buf, 1), Some(0x0504_0302));
        assert_eq!(read_u32_le(&buf, 2), None);
    }

    #[test]
    fn test_truncated_reports_remaining_bytes() {
        let buf = [0u8; 3];
        match read_u32_le_r(&buf, 1, "count") {
            Err(DeserializationError::Truncated {
                what,
                offset,
                need,
                have,
            }) => {
                assert_eq!(what, "count");
                assert_eq!(offset, 1);
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_slice_r_handles_overflowing_length() {
        let buf = [0u8; 4];
        assert!(slice_r(&buf, 2, usize::MAX, "payload").is_err());
        assert_eq!(slice_r(&buf, 4, 0, "payload").unwrap(), &[] as &[u8]);
    }
}
