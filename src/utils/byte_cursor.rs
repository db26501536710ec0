use crate::err::{DeserializationError, DeserializationResult};
use crate::utils::bytes;

use byteorder::{ByteOrder, LittleEndian};

/// Cursor over an immutable byte slice. Reads are little-endian and advance only on success;
/// failures carry the offset they happened at.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> u64 {
        self.pos as u64
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    #[inline]
    pub(crate) fn take_bytes(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> DeserializationResult<&'a [u8]> {
        let out = bytes::slice_r(self.buf, self.pos, len, what)?;
        self.pos += len;
        Ok(out)
    }

    #[inline]
    pub(crate) fn u8_named(&mut self, what: &'static str) -> DeserializationResult<u8> {
        let b = bytes::read_u8_r(self.buf, self.pos, what)?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a single byte boolean.
    ///
    /// Writers only ever emit 0 or 1; anything else is logged and coerced to `true`.
    #[inline]
    pub(crate) fn bool_named(&mut self, what: &'static str) -> DeserializationResult<bool> {
        let offset = self.pos;
        match self.u8_named(what)? {
            0 => Ok(false),
            1 => Ok(true),
            other => {
                log::warn!(
                    "offset {}: {:#04x} is an unknown value for bool `{}`, coercing to `true`",
                    offset,
                    other,
                    what
                );
                Ok(true)
            }
        }
    }

    #[inline]
    pub(crate) fn u16_named(&mut self, what: &'static str) -> DeserializationResult<u16> {
        let v = bytes::read_u16_le_r(self.buf, self.pos, what)?;
        self.pos += 2;
        Ok(v)
    }

    #[inline]
    pub(crate) fn u32_named(&mut self, what: &'static str) -> DeserializationResult<u32> {
        let v = bytes::read_u32_le_r(self.buf, self.pos, what)?;
        self.pos += 4;
        Ok(v)
    }

    #[inline]
    pub(crate) fn i32_named(&mut self, what: &'static str) -> DeserializationResult<i32> {
        let raw = bytes::read_array_r::<4>(self.buf, self.pos, what)?;
        self.pos += 4;
        Ok(LittleEndian::read_i32(&raw))
    }

    #[inline]
    pub(crate) fn f64_named(&mut self, what: &'static str) -> DeserializationResult<f64> {
        let raw = bytes::read_array_r::<8>(self.buf, self.pos, what)?;
        self.pos += 8;
        Ok(LittleEndian::read_f64(&raw))
    }

    /// Reads `len` bytes and validates them as UTF-8.
    pub(crate) fn utf8_str(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> DeserializationResult<&'a str> {
        let offset = self.position();
        let raw = self.take_bytes(len, what)?;
        std::str::from_utf8(raw).map_err(|source| DeserializationError::InvalidUtf8 { offset, source })
    }
}
