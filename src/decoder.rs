use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::DecodeError;
use crate::instruction::Instruction;

pub trait Decoder {
    fn decode(&self, word: u16) -> Result<Instruction, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(&self, word: u16) -> Result<Instruction, DecodeError> {
        (**self).decode(word)
    }
}

/// Memoizes another decoder by word value.
///
/// Decoding is a pure function of the word, so hits and misses return the same thing.
/// Failures are not cached. At most 65536 entries.
pub struct CachedDecoder<D> {
    inner: D,
    cache: RwLock<HashMap<u16, Instruction>>,
}

impl<D: Decoder> CachedDecoder<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut c) = self.cache.write() {
            c.clear();
        }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Decoder> Decoder for CachedDecoder<D> {
    fn decode(&self, word: u16) -> Result<Instruction, DecodeError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&word) {
                tracing::trace!(word = format_args!("{word:#06x}"), "decode cache hit");
                return Ok(hit.clone());
            }
        }
        let instr = self.inner.decode(word)?;
        // a poisoned lock only costs us the memo
        if let Ok(mut cache) = self.cache.write() {
            cache.entry(word).or_insert_with(|| instr.clone());
        }
        Ok(instr)
    }
}
