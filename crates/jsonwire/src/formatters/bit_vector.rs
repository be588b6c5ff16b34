use std::fmt;

use super::collection::ARRAY_SCRATCH_CAPACITY;
use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

const WORD_BITS: usize = u64::BITS as usize;

/// Packed vector of bits.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `len` bits, all set to `value`.
    #[must_use]
    pub fn repeat(value: bool, len: usize) -> Self {
        let fill = if value { u64::MAX } else { 0 };
        let mut bits = Self {
            words: vec![fill; len.div_ceil(WORD_BITS)],
            len,
        };
        bits.clear_unused();
        bits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "index {index} out of bounds for {} bits", self.len);
        let mask = 1 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    pub fn push(&mut self, value: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    fn clear_unused(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1 << used) - 1;
            }
        }
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits = Self::new();
        for value in iter {
            bits.push(value);
        }
        bits
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BitVector(")?;
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        f.write_str(")")
    }
}

/// [`BitVector`] as a JSON array of booleans.
///
/// Decoding reads the booleans into a pooled scratch buffer and packs them
/// once the length is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitVectorFormatter;

impl JsonFormatter<BitVector> for BitVectorFormatter {
    fn serialize(&self, writer: &mut JsonWriter, value: &BitVector, _options: &JsonOptions) -> Result<(), Error> {
        writer.write_begin_array();
        for (i, bit) in value.iter().enumerate() {
            if i != 0 {
                writer.write_value_separator();
            }
            writer.write_boolean(bit);
        }
        writer.write_end_array();
        Ok(())
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<BitVector, Error> {
        if let Some(empty) = options.null_or_default(reader)? {
            return Ok(empty);
        }
        reader.read_is_begin_array_with_verify()?;
        let mut scratch = options.pool.rent::<bool>(ARRAY_SCRATCH_CAPACITY)?;
        let mut count = 0;
        while !reader.read_is_end_array_with_skip_value_separator(&mut count)? {
            scratch.push(reader.read_boolean()?)?;
        }

        let len = scratch.len();
        let mut words = Vec::new();
        words.try_reserve_exact(len.div_ceil(WORD_BITS))?;
        words.extend(scratch.as_slice().chunks(WORD_BITS).map(|chunk| {
            chunk
                .iter()
                .rev()
                .fold(0u64, |word, &bit| (word << 1) | u64::from(bit))
        }));
        Ok(BitVector { words, len })
    }
}
