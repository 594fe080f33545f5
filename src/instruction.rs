use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::bits::{self, WORD_BITS};
use crate::error::EncodeError;
use crate::opcode::Opcode;
use crate::wire::{Nzp, RawInstruction};

/// General-purpose register index, always in `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Reg(u8);

impl Reg {
    pub const R0: Reg = Reg(0);
    pub const R7: Reg = Reg(7);

    pub fn new(index: u8) -> Result<Self, EncodeError> {
        Self::try_from(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Only for values already masked to three bits.
    pub(crate) fn from_field(bits: u16) -> Self {
        Reg((bits & 0x7) as u8)
    }
}

impl TryFrom<u8> for Reg {
    type Error = EncodeError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        if index <= 7 {
            Ok(Reg(index))
        } else {
            Err(EncodeError::InvalidFieldValue {
                field: "register",
                value: index as i32,
                bits: 3,
            })
        }
    }
}

impl From<Reg> for u8 {
    fn from(r: Reg) -> u8 {
        r.0
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

bitflags! {
/// BR condition codes. Serialized as `{"n": bool, "z": bool, "p": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Nzp", into = "Nzp")]
pub struct Cond: u8 {
const N = 0b100; // negative
const Z = 0b010; // zero
const P = 0b001; // positive
}
}

/// Second ALU operand of ADD/AND; the variant picks the encoding (bit 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluSrc {
    Register(Reg),
    /// 5-bit signed, `-16..=15`.
    Immediate(i16),
}

/// A PC-relative operand before or after label resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Offset(i16),
    Label(String),
}

impl Target {
    pub fn label(name: impl Into<String>) -> Self {
        Target::Label(name.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Offset(off) => write!(f, "#{off}"),
            Target::Label(name) => f.write_str(name),
        }
    }
}

/// JSR shares its opcode with JSRR; bit 11 tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsrTarget {
    /// JSRR
    Register(Reg),
    /// JSR with an 11-bit PC-relative offset.
    Pc(Target),
}

/// One LC-3 instruction. RTI and TRAP are not representable.
///
/// On the wire this is the parser's flat object: `operation` plus the operand fields of
/// the form (`srcReg2` or `immediate`, `offset` or `argLabel`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstruction", into = "RawInstruction")]
pub enum Instruction {
    Add {
        dest_reg: Reg,
        src_reg1: Reg,
        src2: AluSrc,
    },
    And {
        dest_reg: Reg,
        src_reg1: Reg,
        src2: AluSrc,
    },
    Br { condition_code: Cond, target: Target },
    Jmp { register: Reg },
    Jsr { target: JsrTarget },
    Ld { register: Reg, target: Target },
    Ldi { register: Reg, target: Target },
    Lea { register: Reg, target: Target },
    St { register: Reg, target: Target },
    Sti { register: Reg, target: Target },
    Ldr {
        move_reg: Reg,
        base_reg: Reg,
        offset: i16,
    },
    Str {
        move_reg: Reg,
        base_reg: Reg,
        offset: i16,
    },
    Not { dest_reg: Reg, src_reg: Reg },
}

/// Bit widths of the signed fields.
pub const IMM5_BITS: u32 = 5;
pub const OFFSET6_BITS: u32 = 6;
pub const PC_OFFSET9_BITS: u32 = 9;
pub const PC_OFFSET11_BITS: u32 = 11;

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Add { .. } => Opcode::Add,
            Instruction::And { .. } => Opcode::And,
            Instruction::Br { .. } => Opcode::Br,
            Instruction::Jmp { .. } => Opcode::Jmp,
            Instruction::Jsr { .. } => Opcode::Jsr,
            Instruction::Ld { .. } => Opcode::Ld,
            Instruction::Ldi { .. } => Opcode::Ldi,
            Instruction::Lea { .. } => Opcode::Lea,
            Instruction::St { .. } => Opcode::St,
            Instruction::Sti { .. } => Opcode::Sti,
            Instruction::Ldr { .. } => Opcode::Ldr,
            Instruction::Str { .. } => Opcode::Str,
            Instruction::Not { .. } => Opcode::Not,
        }
    }

    /// The PC-relative operand and the width of its field, if this form has one.
    pub fn target(&self) -> Option<(&Target, u32)> {
        match self {
            Instruction::Br { target, .. }
            | Instruction::Ld { target, .. }
            | Instruction::Ldi { target, .. }
            | Instruction::Lea { target, .. }
            | Instruction::St { target, .. }
            | Instruction::Sti { target, .. } => Some((target, PC_OFFSET9_BITS)),
            Instruction::Jsr {
                target: JsrTarget::Pc(target),
            } => Some((target, PC_OFFSET11_BITS)),
            _ => None,
        }
    }

    pub(crate) fn target_mut(&mut self) -> Option<&mut Target> {
        match self {
            Instruction::Br { target, .. }
            | Instruction::Ld { target, .. }
            | Instruction::Ldi { target, .. }
            | Instruction::Lea { target, .. }
            | Instruction::St { target, .. }
            | Instruction::Sti { target, .. }
            | Instruction::Jsr {
                target: JsrTarget::Pc(target),
            } => Some(target),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self.target() {
            Some((Target::Label(name), _)) => Some(name),
            _ => None,
        }
    }

    pub fn pc_offset(&self) -> Option<i16> {
        match self.target() {
            Some((Target::Offset(off), _)) => Some(*off),
            _ => None,
        }
    }

    /// Absolute target of a resolved PC-relative form, with 16-bit wraparound.
    pub fn target_address(&self, next_addr: u16) -> Option<u16> {
        let off = self.pc_offset()?;
        Some(bits::add(next_addr as i32, off as i32, WORD_BITS) as u16)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Add {
                dest_reg,
                src_reg1,
                src2,
            }
            | Instruction::And {
                dest_reg,
                src_reg1,
                src2,
            } => {
                let mn = self.opcode().mnemonic();
                match src2 {
                    AluSrc::Register(r) => write!(f, "{mn} {dest_reg}, {src_reg1}, {r}"),
                    AluSrc::Immediate(imm) => write!(f, "{mn} {dest_reg}, {src_reg1}, #{imm}"),
                }
            }
            Instruction::Br {
                condition_code,
                target,
            } => {
                if condition_code.is_empty() {
                    return f.write_str("NOP");
                }
                f.write_str("BR")?;
                for (flag, c) in [(Cond::N, 'n'), (Cond::Z, 'z'), (Cond::P, 'p')] {
                    if condition_code.contains(flag) {
                        write!(f, "{c}")?;
                    }
                }
                write!(f, " {target}")
            }
            Instruction::Jmp { register } if *register == Reg::R7 => f.write_str("RET"),
            Instruction::Jmp { register } => write!(f, "JMP {register}"),
            Instruction::Jsr {
                target: JsrTarget::Register(r),
            } => write!(f, "JSRR {r}"),
            Instruction::Jsr {
                target: JsrTarget::Pc(t),
            } => write!(f, "JSR {t}"),
            Instruction::Ld { register, target }
            | Instruction::Ldi { register, target }
            | Instruction::Lea { register, target }
            | Instruction::St { register, target }
            | Instruction::Sti { register, target } => {
                write!(f, "{} {register}, {target}", self.opcode().mnemonic())
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
            } => write!(
                f,
                "{} {move_reg}, {base_reg}, #{offset}",
                self.opcode().mnemonic()
            ),
            Instruction::Not { dest_reg, src_reg } => write!(f, "NOT {dest_reg}, {src_reg}"),
        }
    }
}
