pub mod assembler;
pub mod bits;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod image;
pub mod instruction;
pub mod opcode;
pub mod symbols;
mod wire;

pub mod isa {
    pub mod lc3;
}

pub use assembler::{assemble, AsmConfig, Assembled, Assembler, CodeBlock, Program, Statement};
pub use decoder::{CachedDecoder, Decoder};
pub use encoder::{encode, Encoder, OffsetCheck};
pub use error::{AsmError, AsmErrors, DecodeError, EncodeError, FormatError};
pub use image::{Image, Segment};
pub use instruction::{AluSrc, Cond, Instruction, JsrTarget, Reg, Target};
pub use isa::lc3::{decode, Lc3Decoder};
pub use opcode::Opcode;
pub use symbols::SymbolTable;
