use std::fmt;

use crate::opcode::Opcode;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BitsError {
    #[error("not a binary digit: {0:?}")]
    BadDigit(char),
    #[error("{0} bits do not fit in a 32-bit word")]
    TooWide(u32),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// RTI, TRAP and the reserved opcode have no decoding.
    #[error("unsupported opcode {opcode:#x} ({}) in word {word:#06x}", mnemonic_or_reserved(.opcode))]
    UnknownOpcode { word: u16, opcode: u8 },
}

fn mnemonic_or_reserved(opcode: &u8) -> &'static str {
    Opcode::from_bits(*opcode).map_or("reserved", Opcode::mnemonic)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unresolved label `{label}`")]
    UnresolvedLabel { label: String },
    #[error("offset {offset} to `{label}` does not fit in {bits} signed bits")]
    OffsetOutOfRange {
        label: String,
        offset: i32,
        bits: u32,
    },
    #[error("{field} = {value} is out of range for a {bits}-bit field")]
    InvalidFieldValue {
        field: &'static str,
        value: i32,
        bits: u32,
    },
}

/// A JSON instruction object that does not describe exactly one instruction form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("{0} instructions are not supported")]
    Unsupported(&'static str),
    #[error("{operation}: missing `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
    #[error("{operation}: `{first}` and `{second}` cannot both be given")]
    Conflict {
        operation: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("label `{label}` defined at {second:#06x} was already defined at {first:#06x}")]
    DuplicateLabel { label: String, first: u16, second: u16 },
    #[error("block at {second:#06x} overlaps block at {first:#06x}")]
    OverlappingBlocks { first: u16, second: u16 },
    #[error("block at {origin:#06x} with {len} words runs past the end of memory")]
    BlockOverflow { origin: u16, len: usize },
    #[error("at {addr:#06x}: {source}")]
    Encode {
        addr: u16,
        #[source]
        source: EncodeError,
    },
}

/// Every problem found while assembling one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmErrors(pub Vec<AsmError>);

impl AsmErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, AsmError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AsmErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} assembly error(s)", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AsmErrors {}

impl<'a> IntoIterator for &'a AsmErrors {
    type Item = &'a AsmError;
    type IntoIter = std::slice::Iter<'a, AsmError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("raw image has an odd number of bytes ({0})")]
    OddLength(usize),
    #[error("{len} words at {origin:#06x} run past the end of memory")]
    Overflow { origin: u16, len: usize },
}
