use serde::{Deserialize, Serialize};

use crate::bits::{fits_signed, truncate, BitPacker, Field, WORD_BITS};
use crate::error::EncodeError;
use crate::instruction::{
    AluSrc, Cond, Instruction, JsrTarget, Reg, Target, IMM5_BITS, OFFSET6_BITS, PC_OFFSET11_BITS,
    PC_OFFSET9_BITS,
};
use crate::symbols::SymbolTable;

/// What to do with a label offset that does not fit its field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetCheck {
    /// Fail with [`EncodeError::OffsetOutOfRange`].
    #[default]
    Strict,
    /// Keep the low bits, like older LC-3 tools do.
    Wrap,
}

static ALU_REG: [Field; 3] = [
    Field::new("destReg", 9, 11),
    Field::new("srcReg1", 6, 8),
    Field::new("srcReg2", 0, 2),
];
static ALU_IMM: [Field; 3] = [
    Field::new("destReg", 9, 11),
    Field::new("srcReg1", 6, 8),
    Field::new("immediate", 0, 4),
];
static NZP: [Field; 3] = [
    Field::new("n", 11, 11),
    Field::new("z", 10, 10),
    Field::new("p", 9, 9),
];
static HIGH_REG: [Field; 1] = [Field::new("register", 9, 11)];
static BASE_REG: [Field; 1] = [Field::new("register", 6, 8)];
static BASE_OFFSET: [Field; 3] = [
    Field::new("moveReg", 9, 11),
    Field::new("baseReg", 6, 8),
    Field::new("offset", 0, 5),
];
static NOT: [Field; 2] = [Field::new("destReg", 9, 11), Field::new("srcReg", 6, 8)];

const IMM_FLAG: u16 = 1 << 5;
const JSR_FLAG: u16 = 1 << 11;
const NOT_LOW_ONES: u16 = 0x3F;

#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    pub offsets: OffsetCheck,
}

impl Encoder {
    pub fn new(offsets: OffsetCheck) -> Self {
        Self { offsets }
    }

    /// Encode one instruction.
    ///
    /// `next_addr` is the address of the following instruction: PC-relative offsets count
    /// from the already-incremented program counter. `next_addr` and `symbols` are only
    /// consulted for label operands.
    pub fn encode(
        &self,
        instr: &Instruction,
        next_addr: u16,
        symbols: &SymbolTable,
    ) -> Result<u16, EncodeError> {
        let mask = instr.opcode().mask();
        let r = |reg: &Reg| reg.index() as i32;

        let word = match instr {
            Instruction::Add {
                dest_reg,
                src_reg1,
                src2,
            }
            | Instruction::And {
                dest_reg,
                src_reg1,
                src2,
            } => match src2 {
                AluSrc::Register(src_reg2) => {
                    BitPacker::new(&ALU_REG, mask).pack(&[r(dest_reg), r(src_reg1), r(src_reg2)])
                }
                AluSrc::Immediate(imm) => {
                    let imm = check_field("immediate", *imm as i32, IMM5_BITS)?;
                    BitPacker::new(&ALU_IMM, mask | IMM_FLAG).pack(&[
                        r(dest_reg),
                        r(src_reg1),
                        imm,
                    ])
                }
            },
            Instruction::Br {
                condition_code,
                target,
            } => {
                let offset = self.resolve(target, PC_OFFSET9_BITS, next_addr, symbols)?;
                let cc = BitPacker::new(&NZP, mask).pack(&[
                    condition_code.contains(Cond::N) as i32,
                    condition_code.contains(Cond::Z) as i32,
                    condition_code.contains(Cond::P) as i32,
                ]);
                cc | low_bits(offset, PC_OFFSET9_BITS)
            }
            Instruction::Jmp { register } => BitPacker::new(&BASE_REG, mask).pack(&[r(register)]),
            Instruction::Jsr {
                target: JsrTarget::Register(register),
            } => BitPacker::new(&BASE_REG, mask).pack(&[r(register)]),
            Instruction::Jsr {
                target: JsrTarget::Pc(target),
            } => {
                let offset = self.resolve(target, PC_OFFSET11_BITS, next_addr, symbols)?;
                mask | JSR_FLAG | low_bits(offset, PC_OFFSET11_BITS)
            }
            Instruction::Ld { register, target }
            | Instruction::Ldi { register, target }
            | Instruction::Lea { register, target }
            | Instruction::St { register, target }
            | Instruction::Sti { register, target } => {
                let offset = self.resolve(target, PC_OFFSET9_BITS, next_addr, symbols)?;
                BitPacker::new(&HIGH_REG, mask).pack(&[r(register)])
                    | low_bits(offset, PC_OFFSET9_BITS)
            }
            Instruction::Ldr {
                move_reg,
                base_reg,
                offset,
            }
            | Instruction::Str {
                move_reg,
                base_reg,
                offset,
            } => {
                let offset = check_field("offset", *offset as i32, OFFSET6_BITS)?;
                BitPacker::new(&BASE_OFFSET, mask).pack(&[r(move_reg), r(base_reg), offset])
            }
            Instruction::Not { dest_reg, src_reg } => {
                BitPacker::new(&NOT, mask | NOT_LOW_ONES).pack(&[r(dest_reg), r(src_reg)])
            }
        };
        tracing::trace!(%instr, word = format_args!("{word:#06x}"), "encoded");
        Ok(word)
    }

    fn resolve(
        &self,
        target: &Target,
        width: u32,
        next_addr: u16,
        symbols: &SymbolTable,
    ) -> Result<i32, EncodeError> {
        let name = match target {
            Target::Offset(off) => return check_field("offset", *off as i32, width),
            Target::Label(name) => name,
        };
        let addr = symbols
            .get(name)
            .ok_or_else(|| EncodeError::UnresolvedLabel {
                label: name.clone(),
            })?;
        // addresses wrap at 16 bits
        let offset = truncate(addr as i32 - next_addr as i32, WORD_BITS);
        if fits_signed(offset, width) {
            return Ok(offset);
        }
        match self.offsets {
            OffsetCheck::Strict => Err(EncodeError::OffsetOutOfRange {
                label: name.clone(),
                offset,
                bits: width,
            }),
            OffsetCheck::Wrap => {
                tracing::warn!(label = %name, offset, bits = width, "offset truncated to field width");
                Ok(offset)
            }
        }
    }
}

/// Encode with range-checked offsets.
pub fn encode(
    instr: &Instruction,
    next_addr: u16,
    symbols: &SymbolTable,
) -> Result<u16, EncodeError> {
    Encoder::default().encode(instr, next_addr, symbols)
}

fn check_field(field: &'static str, value: i32, bits: u32) -> Result<i32, EncodeError> {
    if fits_signed(value, bits) {
        Ok(value)
    } else {
        Err(EncodeError::InvalidFieldValue { field, value, bits })
    }
}

fn low_bits(value: i32, width: u32) -> u16 {
    (value as u32 & ((1u32 << width) - 1)) as u16
}
