//! JSON shape of an instruction as handed over by the parser.
//!
//! Operands are flat optional fields; which ones are present picks the form.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::instruction::{AluSrc, Cond, Instruction, JsrTarget, Reg, Target};
use crate::opcode::{self, Form, Opcode};

/// `conditionCode` object. Missing flags are clear.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Nzp {
    n: bool,
    z: bool,
    p: bool,
}

impl From<Nzp> for Cond {
    fn from(c: Nzp) -> Self {
        let mut cond = Cond::empty();
        cond.set(Cond::N, c.n);
        cond.set(Cond::Z, c.z);
        cond.set(Cond::P, c.p);
        cond
    }
}

impl From<Cond> for Nzp {
    fn from(c: Cond) -> Self {
        Nzp {
            n: c.contains(Cond::N),
            z: c.contains(Cond::Z),
            p: c.contains(Cond::P),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInstruction {
    operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition_code: Option<Cond>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest_reg: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_reg1: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_reg2: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    immediate: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_reg: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    register: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_reg: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_reg: Option<Reg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i16>,
    #[serde(alias = "gotoLabel", skip_serializing_if = "Option::is_none")]
    arg_label: Option<String>,
}

fn required<T>(value: Option<T>, operation: &'static str, field: &'static str) -> Result<T, FormatError> {
    value.ok_or(FormatError::MissingField { operation, field })
}

fn pc_target(
    offset: Option<i16>,
    label: Option<String>,
    operation: &'static str,
) -> Result<Target, FormatError> {
    match (offset, label) {
        (Some(off), None) => Ok(Target::Offset(off)),
        (None, Some(name)) => Ok(Target::Label(name)),
        (Some(_), Some(_)) => Err(FormatError::Conflict {
            operation,
            first: "offset",
            second: "argLabel",
        }),
        (None, None) => Err(FormatError::MissingField {
            operation,
            field: "argLabel",
        }),
    }
}

impl TryFrom<RawInstruction> for Instruction {
    type Error = FormatError;

    fn try_from(raw: RawInstruction) -> Result<Self, Self::Error> {
        let desc = opcode::lookup(&raw.operation)
            .ok_or_else(|| FormatError::UnknownOperation(raw.operation.clone()))?;
        let op = desc.mnemonic;

        let instr = match (desc.opcode, desc.form) {
            (Opcode::Add | Opcode::And, _) => {
                let dest_reg = required(raw.dest_reg, op, "destReg")?;
                let src_reg1 = required(raw.src_reg1, op, "srcReg1")?;
                let src2 = match (raw.src_reg2, raw.immediate) {
                    (Some(r), None) => AluSrc::Register(r),
                    (None, Some(imm)) => AluSrc::Immediate(imm),
                    (Some(_), Some(_)) => {
                        return Err(FormatError::Conflict {
                            operation: op,
                            first: "srcReg2",
                            second: "immediate",
                        })
                    }
                    (None, None) => {
                        return Err(FormatError::MissingField {
                            operation: op,
                            field: "srcReg2",
                        })
                    }
                };
                if desc.opcode == Opcode::Add {
                    Instruction::Add { dest_reg, src_reg1, src2 }
                } else {
                    Instruction::And { dest_reg, src_reg1, src2 }
                }
            }
            (Opcode::Br, _) => Instruction::Br {
                condition_code: required(raw.condition_code, op, "conditionCode")?,
                target: pc_target(raw.offset, raw.arg_label, op)?,
            },
            (Opcode::Jmp, Form::Ret) => Instruction::Jmp { register: Reg::R7 },
            (Opcode::Jmp, _) => Instruction::Jmp {
                register: required(raw.register, op, "register")?,
            },
            (Opcode::Jsr, Form::JsrRegister) => Instruction::Jsr {
                target: JsrTarget::Register(required(raw.register, op, "register")?),
            },
            (Opcode::Jsr, _) => {
                let target = match raw.register {
                    Some(_) if raw.offset.is_some() || raw.arg_label.is_some() => {
                        return Err(FormatError::Conflict {
                            operation: op,
                            first: "register",
                            second: "argLabel",
                        })
                    }
                    Some(r) => JsrTarget::Register(r),
                    None => JsrTarget::Pc(pc_target(raw.offset, raw.arg_label, op)?),
                };
                Instruction::Jsr { target }
            }
            (Opcode::Ld | Opcode::Ldi | Opcode::Lea | Opcode::St | Opcode::Sti, _) => {
                let register = required(raw.register, op, "register")?;
                let target = pc_target(raw.offset, raw.arg_label, op)?;
                match desc.opcode {
                    Opcode::Ld => Instruction::Ld { register, target },
                    Opcode::Ldi => Instruction::Ldi { register, target },
                    Opcode::Lea => Instruction::Lea { register, target },
                    Opcode::St => Instruction::St { register, target },
                    _ => Instruction::Sti { register, target },
                }
            }
            (Opcode::Ldr | Opcode::Str, _) => {
                let move_reg = required(raw.move_reg, op, "moveReg")?;
                let base_reg = required(raw.base_reg, op, "baseReg")?;
                let offset = required(raw.offset, op, "offset")?;
                if desc.opcode == Opcode::Ldr {
                    Instruction::Ldr { move_reg, base_reg, offset }
                } else {
                    Instruction::Str { move_reg, base_reg, offset }
                }
            }
            (Opcode::Not, _) => Instruction::Not {
                dest_reg: required(raw.dest_reg, op, "destReg")?,
                src_reg: required(raw.src_reg, op, "srcReg")?,
            },
            (Opcode::Rti | Opcode::Trap, _) => return Err(FormatError::Unsupported(op)),
        };
        Ok(instr)
    }
}

fn split(target: Target) -> (Option<i16>, Option<String>) {
    match target {
        Target::Offset(off) => (Some(off), None),
        Target::Label(name) => (None, Some(name)),
    }
}

impl From<Instruction> for RawInstruction {
    fn from(instr: Instruction) -> Self {
        let mut raw = RawInstruction {
            operation: instr.opcode().mnemonic().to_string(),
            ..Default::default()
        };
        match instr {
            Instruction::Add { dest_reg, src_reg1, src2 }
            | Instruction::And { dest_reg, src_reg1, src2 } => {
                raw.dest_reg = Some(dest_reg);
                raw.src_reg1 = Some(src_reg1);
                match src2 {
                    AluSrc::Register(r) => raw.src_reg2 = Some(r),
                    AluSrc::Immediate(imm) => raw.immediate = Some(imm),
                }
            }
            Instruction::Br { condition_code, target } => {
                raw.condition_code = Some(condition_code);
                (raw.offset, raw.arg_label) = split(target);
            }
            Instruction::Jmp { register } => raw.register = Some(register),
            Instruction::Jsr { target: JsrTarget::Register(r) } => raw.register = Some(r),
            Instruction::Jsr { target: JsrTarget::Pc(target) } => {
                (raw.offset, raw.arg_label) = split(target);
            }
            Instruction::Ld { register, target }
            | Instruction::Ldi { register, target }
            | Instruction::Lea { register, target }
            | Instruction::St { register, target }
            | Instruction::Sti { register, target } => {
                raw.register = Some(register);
                (raw.offset, raw.arg_label) = split(target);
            }
            Instruction::Ldr { move_reg, base_reg, offset }
            | Instruction::Str { move_reg, base_reg, offset } => {
                raw.move_reg = Some(move_reg);
                raw.base_reg = Some(base_reg);
                raw.offset = Some(offset);
            }
            Instruction::Not { dest_reg, src_reg } => {
                raw.dest_reg = Some(dest_reg);
                raw.src_reg = Some(src_reg);
            }
        }
        raw
    }
}
