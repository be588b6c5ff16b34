//! Append-only JSON byte sink.
//!
//! `JsonWriter` owns a single growable buffer and a cursor. Producers either
//! call one of the `write_*` helpers or use the two-step protocol directly:
//! [`JsonWriter::reserve`] hands out a writable span of at least `n` bytes
//! without moving the cursor, and [`JsonWriter::commit`] advances the cursor
//! by the number of bytes actually produced.
//!
//! Growth allocates a new buffer of at least twice the old capacity, copies
//! the committed bytes and drops the old one. Committed bytes are never
//! moved otherwise.

use crate::escape;

const DEFAULT_CAPACITY: usize = 256;

/// Worst-case decimal length of an `i64` (`-9223372036854775808`).
pub(crate) const MAX_I64_LEN: usize = 20;
/// Worst-case decimal length of a `u64`.
pub(crate) const MAX_U64_LEN: usize = 20;
/// Worst-case length of a shortest round-trip `f64` (as produced by `ryu`).
pub(crate) const MAX_F64_LEN: usize = 24;

/// Growable output buffer with a write cursor.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    buf: Vec<u8>,
    offset: usize,
    reserved: usize,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriter {
    /// An empty writer with a small initial buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// An empty writer whose buffer holds `capacity` bytes before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            offset: 0,
            reserved: 0,
        }
    }

    /// Number of committed bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Size of the underlying buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The committed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.offset]
    }

    /// The committed bytes, with the unused tail of the buffer dropped.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.offset);
        self.buf
    }

    /// Discards committed bytes, keeping the buffer.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.reserved = 0;
    }

    /// Returns a writable span of at least `n` bytes starting at the cursor.
    ///
    /// The cursor does not move; follow up with [`commit`](Self::commit).
    pub fn reserve(&mut self, n: usize) -> &mut [u8] {
        if self.buf.len() - self.offset < n {
            self.grow(n);
        }
        self.reserved = n;
        &mut self.buf[self.offset..]
    }

    /// Advances the cursor over `n` bytes written into the last reservation.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the length passed to the last `reserve` call.
    pub fn commit(&mut self, n: usize) {
        assert!(
            n <= self.reserved,
            "commit of {n} bytes exceeds reservation of {} bytes",
            self.reserved
        );
        self.offset += n;
        self.reserved = 0;
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, n: usize) {
        let required = self.offset + n;
        let new_len = required.max(self.buf.len() * 2);
        let mut next = vec![0; new_len];
        next[..self.offset].copy_from_slice(&self.buf[..self.offset]);
        self.buf = next;
    }

    /// Copies `bytes` verbatim. The caller guarantees they are valid JSON in
    /// this position.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        let span = self.reserve(bytes.len());
        span[..bytes.len()].copy_from_slice(bytes);
        self.commit(bytes.len());
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) {
        let span = self.reserve(1);
        span[0] = byte;
        self.commit(1);
    }

    /// `[`
    #[inline]
    pub fn write_begin_array(&mut self) {
        self.write_byte(b'[');
    }

    /// `]`
    #[inline]
    pub fn write_end_array(&mut self) {
        self.write_byte(b']');
    }

    /// `{`
    #[inline]
    pub fn write_begin_object(&mut self) {
        self.write_byte(b'{');
    }

    /// `}`
    #[inline]
    pub fn write_end_object(&mut self) {
        self.write_byte(b'}');
    }

    /// `,` between array elements or object members.
    #[inline]
    pub fn write_value_separator(&mut self) {
        self.write_byte(b',');
    }

    /// `:` after a property name.
    #[inline]
    pub fn write_name_separator(&mut self) {
        self.write_byte(b':');
    }

    /// A lone `"`, for producers that write string contents themselves.
    #[inline]
    pub fn write_quotation(&mut self) {
        self.write_byte(b'"');
    }

    /// `null`
    pub fn write_null(&mut self) {
        self.write_raw(b"null");
    }

    /// `true` or `false`.
    pub fn write_boolean(&mut self, value: bool) {
        self.write_raw(if value { b"true" } else { b"false" });
    }

    /// Decimal form of `value`, formatted by `itoa` into a worst-case
    /// reservation.
    pub fn write_i64(&mut self, value: i64) {
        let mut digits = itoa::Buffer::new();
        let text = digits.format(value).as_bytes();
        let span = self.reserve(MAX_I64_LEN);
        span[..text.len()].copy_from_slice(text);
        self.commit(text.len());
    }

    /// Decimal form of `value`.
    pub fn write_u64(&mut self, value: u64) {
        let mut digits = itoa::Buffer::new();
        let text = digits.format(value).as_bytes();
        let span = self.reserve(MAX_U64_LEN);
        span[..text.len()].copy_from_slice(text);
        self.commit(text.len());
    }

    /// Decimal form of `value`.
    pub fn write_i8(&mut self, value: i8) {
        self.write_i64(i64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_i16(&mut self, value: i16) {
        self.write_i64(i64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_i32(&mut self, value: i32) {
        self.write_i64(i64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_isize(&mut self, value: isize) {
        self.write_i64(value as i64);
    }

    /// Decimal form of `value`.
    pub fn write_u8(&mut self, value: u8) {
        self.write_u64(u64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_u16(&mut self, value: u16) {
        self.write_u64(u64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_u32(&mut self, value: u32) {
        self.write_u64(u64::from(value));
    }

    /// Decimal form of `value`.
    pub fn write_usize(&mut self, value: usize) {
        self.write_u64(value as u64);
    }

    /// Writes the shortest representation that reads back to `value`.
    ///
    /// JSON has no literal for NaN or the infinities; they are written as the
    /// strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
    pub fn write_f64(&mut self, value: f64) {
        if !value.is_finite() {
            self.write_non_finite(value.is_nan(), value.is_sign_negative());
            return;
        }
        let mut digits = ryu::Buffer::new();
        let text = digits.format_finite(value).as_bytes();
        let span = self.reserve(MAX_F64_LEN);
        span[..text.len()].copy_from_slice(text);
        self.commit(text.len());
    }

    /// Shortest representation that reads back to the same `f32`, with the
    /// same non-finite handling as [`write_f64`](Self::write_f64).
    pub fn write_f32(&mut self, value: f32) {
        if !value.is_finite() {
            self.write_non_finite(value.is_nan(), value.is_sign_negative());
            return;
        }
        let mut digits = ryu::Buffer::new();
        let text = digits.format_finite(value).as_bytes();
        let span = self.reserve(MAX_F64_LEN);
        span[..text.len()].copy_from_slice(text);
        self.commit(text.len());
    }

    fn write_non_finite(&mut self, nan: bool, negative: bool) {
        self.write_raw(match (nan, negative) {
            (true, _) => b"\"NaN\"",
            (false, false) => b"\"Infinity\"",
            (false, true) => b"\"-Infinity\"",
        });
    }

    /// Writes `value` as a quoted JSON string, escaping as needed.
    ///
    /// The escaped length is measured first, so the reservation is exactly
    /// the bytes written.
    pub fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        let len = escape::escaped_len(bytes);
        let span = self.reserve(len + 2);
        span[0] = b'"';
        escape::escape_into(bytes, &mut span[1..=len]);
        span[len + 1] = b'"';
        self.commit(len + 2);
    }

    /// Writes `"name":`.
    pub fn write_property_name(&mut self, name: &str) {
        self.write_string(name);
        self.write_name_separator();
    }
}
