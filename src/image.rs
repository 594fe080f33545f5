use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Contiguous words starting at `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl Segment {
    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.origin && ((addr - self.origin) as usize) < self.words.len()
    }

    pub fn read_word(&self, addr: u16) -> Option<u16> {
        if self.contains(addr) {
            Some(self.words[(addr - self.origin) as usize])
        } else {
            None
        }
    }
}

/// Word-addressed memory image, one segment per code block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub segments: Vec<Segment>,
}

impl Image {
    /// Load a raw big-endian word stream placed at `origin`.
    pub fn from_be_bytes(origin: u16, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() % 2 != 0 {
            return Err(ImageError::OddLength(bytes.len()));
        }
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        if origin as usize + words.len() > 0x1_0000 {
            return Err(ImageError::Overflow {
                origin,
                len: words.len(),
            });
        }
        Ok(Self {
            segments: vec![Segment { origin, words }],
        })
    }

    /// All segments back to back, big-endian. Origins are not recorded.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.words().flat_map(u16::to_be_bytes).collect()
    }

    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        self.segments.iter().flat_map(|s| s.words.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_word(&self, addr: u16) -> Option<u16> {
        self.segments.iter().find_map(|s| s.read_word(addr))
    }

    pub fn is_mapped(&self, addr: u16) -> bool {
        self.segments.iter().any(|s| s.contains(addr))
    }
}
