use crate::bits::{fetch_bits, test_bit, truncate};
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::instruction::{
    AluSrc, Cond, Instruction, JsrTarget, Reg, Target, IMM5_BITS, OFFSET6_BITS, PC_OFFSET11_BITS,
    PC_OFFSET9_BITS,
};
use crate::opcode::Opcode;

/// LC-3 word decoder.
///
/// Dispatches on bits 12..15. ADD/AND look at bit 5 and JSR at bit 11 to pick a form;
/// every other opcode has a single layout. All offsets and immediates are sign-extended.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lc3Decoder;

impl Lc3Decoder {
    pub fn new() -> Self {
        Self
    }
}

fn reg(word: u16, from: u32) -> Reg {
    Reg::from_field(fetch_bits(word, from, from + 2))
}

fn signed(word: u16, width: u32) -> i16 {
    truncate(fetch_bits(word, 0, width - 1) as i32, width) as i16
}

fn pc_target(word: u16, width: u32) -> Target {
    Target::Offset(signed(word, width))
}

impl Decoder for Lc3Decoder {
    fn decode(&self, word: u16) -> Result<Instruction, DecodeError> {
        let bits = fetch_bits(word, 12, 15) as u8;
        let unknown = DecodeError::UnknownOpcode { word, opcode: bits };
        let op = Opcode::from_bits(bits).ok_or(unknown.clone())?;

        let instr = match op {
            Opcode::Add | Opcode::And => {
                let dest_reg = reg(word, 9);
                let src_reg1 = reg(word, 6);
                let src2 = if test_bit(word, 5) {
                    AluSrc::Immediate(signed(word, IMM5_BITS))
                } else {
                    AluSrc::Register(reg(word, 0))
                };
                if op == Opcode::Add {
                    Instruction::Add { dest_reg, src_reg1, src2 }
                } else {
                    Instruction::And { dest_reg, src_reg1, src2 }
                }
            }
            Opcode::Br => {
                let mut condition_code = Cond::empty();
                condition_code.set(Cond::N, test_bit(word, 11));
                condition_code.set(Cond::Z, test_bit(word, 10));
                condition_code.set(Cond::P, test_bit(word, 9));
                Instruction::Br {
                    condition_code,
                    target: pc_target(word, PC_OFFSET9_BITS),
                }
            }
            Opcode::Jmp => Instruction::Jmp { register: reg(word, 6) },
            Opcode::Jsr => {
                let target = if test_bit(word, 11) {
                    JsrTarget::Pc(pc_target(word, PC_OFFSET11_BITS))
                } else {
                    JsrTarget::Register(reg(word, 6))
                };
                Instruction::Jsr { target }
            }
            Opcode::Ld | Opcode::Ldi | Opcode::Lea | Opcode::St | Opcode::Sti => {
                let register = reg(word, 9);
                let target = pc_target(word, PC_OFFSET9_BITS);
                match op {
                    Opcode::Ld => Instruction::Ld { register, target },
                    Opcode::Ldi => Instruction::Ldi { register, target },
                    Opcode::Lea => Instruction::Lea { register, target },
                    Opcode::St => Instruction::St { register, target },
                    _ => Instruction::Sti { register, target },
                }
            }
            Opcode::Ldr | Opcode::Str => {
                let move_reg = reg(word, 9);
                let base_reg = reg(word, 6);
                let offset = signed(word, OFFSET6_BITS);
                if op == Opcode::Ldr {
                    Instruction::Ldr { move_reg, base_reg, offset }
                } else {
                    Instruction::Str { move_reg, base_reg, offset }
                }
            }
            Opcode::Not => Instruction::Not {
                dest_reg: reg(word, 9),
                src_reg: reg(word, 6),
            },
            Opcode::Rti | Opcode::Trap => return Err(unknown),
        };
        Ok(instr)
    }
}

/// Decode one word with [`Lc3Decoder`].
pub fn decode(word: u16) -> Result<Instruction, DecodeError> {
    Lc3Decoder.decode(word)
}
