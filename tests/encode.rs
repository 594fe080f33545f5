use pretty_assertions::assert_eq;

use lc3_core::disasm::symbolize;
use lc3_core::opcode::{self, Form, Opcode};
use lc3_core::{
    decode, encode, AluSrc, Cond, EncodeError, Encoder, Instruction, JsrTarget, OffsetCheck, Reg,
    SymbolTable, Target,
};

const NEXT: u16 = 0x4000;

fn r(n: u8) -> Reg {
    Reg::new(n).unwrap()
}

fn symbols() -> SymbolTable {
    SymbolTable::from_iter([("ARGLABEL", 0x40AA)])
}

fn arg() -> Target {
    Target::label("ARGLABEL")
}

#[test]
fn encodes_label_forms_relative_to_next_address() {
    let syms = symbols();
    let cases = [
        (Instruction::Br { condition_code: Cond::empty(), target: arg() }, 0x00AA),
        (Instruction::Br { condition_code: Cond::Z | Cond::P, target: arg() }, 0x06AA),
        (Instruction::Jsr { target: JsrTarget::Pc(arg()) }, 0x48AA),
        (Instruction::Ld { register: r(5), target: arg() }, 0x2AAA),
        (Instruction::Ldi { register: r(5), target: arg() }, 0xAAAA),
        (Instruction::Lea { register: r(5), target: arg() }, 0xEAAA),
        (Instruction::St { register: r(5), target: arg() }, 0x3AAA),
        (Instruction::Sti { register: r(5), target: arg() }, 0xBAAA),
    ];
    for (instr, expected) in cases {
        assert_eq!(encode(&instr, NEXT, &syms), Ok(expected), "{instr}");
    }
}

#[test]
fn encodes_register_and_immediate_forms() {
    let syms = SymbolTable::new();
    let cases = [
        (Instruction::Add { dest_reg: r(6), src_reg1: r(1), src2: AluSrc::Register(r(2)) }, 0x1C42),
        (Instruction::Add { dest_reg: r(5), src_reg1: r(1), src2: AluSrc::Immediate(-11) }, 0x1A75),
        (Instruction::And { dest_reg: r(6), src_reg1: r(1), src2: AluSrc::Register(r(2)) }, 0x5C42),
        (Instruction::And { dest_reg: r(5), src_reg1: r(1), src2: AluSrc::Immediate(-11) }, 0x5A75),
        (Instruction::Jmp { register: r(5) }, 0xC140),
        (Instruction::Jmp { register: Reg::R7 }, 0xC1C0),
        (Instruction::Jsr { target: JsrTarget::Register(r(5)) }, 0x4140),
        (Instruction::Ldr { move_reg: r(5), base_reg: r(2), offset: -22 }, 0x6AAA),
        (Instruction::Str { move_reg: r(5), base_reg: r(2), offset: -22 }, 0x7AAA),
        (Instruction::Not { dest_reg: r(5), src_reg: r(2) }, 0x9ABF),
        (Instruction::Ld { register: r(0), target: Target::Offset(-1) }, 0x21FF),
    ];
    for (instr, expected) in cases {
        assert_eq!(encode(&instr, NEXT, &syms), Ok(expected), "{instr}");
    }
}

#[test]
fn zero_immediate_still_selects_immediate_form() {
    let syms = SymbolTable::new();
    let imm = Instruction::Add { dest_reg: r(0), src_reg1: r(0), src2: AluSrc::Immediate(0) };
    let reg = Instruction::Add { dest_reg: r(0), src_reg1: r(0), src2: AluSrc::Register(r(0)) };
    assert_eq!(encode(&imm, 0, &syms), Ok(0x1020));
    assert_eq!(encode(&reg, 0, &syms), Ok(0x1000));
}

#[test]
fn numeric_forms_round_trip_at_field_limits() {
    let syms = SymbolTable::new();
    let mut instrs = Vec::new();
    for n in [0u8, 7] {
        for imm in [-16i16, 0, 15] {
            instrs.push(Instruction::Add { dest_reg: r(n), src_reg1: r(7 - n), src2: AluSrc::Immediate(imm) });
            instrs.push(Instruction::And { dest_reg: r(7 - n), src_reg1: r(n), src2: AluSrc::Immediate(imm) });
        }
        instrs.push(Instruction::Add { dest_reg: r(n), src_reg1: r(n), src2: AluSrc::Register(r(7 - n)) });
        instrs.push(Instruction::Jmp { register: r(n) });
        instrs.push(Instruction::Jsr { target: JsrTarget::Register(r(n)) });
        instrs.push(Instruction::Not { dest_reg: r(n), src_reg: r(7 - n) });
        for off in [-256i16, 0, 255] {
            instrs.push(Instruction::Br { condition_code: Cond::all(), target: Target::Offset(off) });
            instrs.push(Instruction::Ld { register: r(n), target: Target::Offset(off) });
            instrs.push(Instruction::Ldi { register: r(n), target: Target::Offset(off) });
            instrs.push(Instruction::Lea { register: r(n), target: Target::Offset(off) });
            instrs.push(Instruction::St { register: r(n), target: Target::Offset(off) });
            instrs.push(Instruction::Sti { register: r(n), target: Target::Offset(off) });
        }
        for off in [-32i16, 31] {
            instrs.push(Instruction::Ldr { move_reg: r(n), base_reg: r(7 - n), offset: off });
            instrs.push(Instruction::Str { move_reg: r(7 - n), base_reg: r(n), offset: off });
        }
    }
    for off in [-1024i16, 1023] {
        instrs.push(Instruction::Jsr { target: JsrTarget::Pc(Target::Offset(off)) });
    }
    for instr in instrs {
        let w = encode(&instr, NEXT, &syms).unwrap();
        assert_eq!(decode(w), Ok(instr.clone()), "{instr} -> {w:#06x}");
    }
}

#[test]
fn label_forms_round_trip_after_resolution() {
    let syms = symbols();
    let ld = Instruction::Ld { register: r(5), target: arg() };
    let w = encode(&ld, NEXT, &syms).unwrap();
    let back = decode(w).unwrap();
    assert_eq!(back, Instruction::Ld { register: r(5), target: Target::Offset(0xAA) });
    assert_eq!(back.target_address(NEXT), Some(0x40AA));
    assert_eq!(symbolize(&back, NEXT, &syms), ld);
}

#[test]
fn unresolved_label_yields_no_word() {
    let instr = Instruction::Ld { register: r(1), target: Target::label("MISSING") };
    assert_eq!(
        encode(&instr, NEXT, &symbols()),
        Err(EncodeError::UnresolvedLabel { label: "MISSING".into() })
    );
    // labels are case-sensitive
    let instr = Instruction::Jsr { target: JsrTarget::Pc(Target::label("arglabel")) };
    assert!(matches!(
        encode(&instr, NEXT, &symbols()),
        Err(EncodeError::UnresolvedLabel { .. })
    ));
}

#[test]
fn label_offsets_are_range_checked() {
    let syms = SymbolTable::from_iter([("FAR", NEXT + 256), ("EDGE", NEXT + 255), ("BACK", NEXT - 1024)]);
    let far = Instruction::Ld { register: r(5), target: Target::label("FAR") };
    assert_eq!(
        encode(&far, NEXT, &syms),
        Err(EncodeError::OffsetOutOfRange { label: "FAR".into(), offset: 256, bits: 9 })
    );
    let edge = Instruction::Ld { register: r(5), target: Target::label("EDGE") };
    assert_eq!(encode(&edge, NEXT, &syms), Ok(0x2AFF));

    // JSR has 11 bits of reach
    let jsr = Instruction::Jsr { target: JsrTarget::Pc(Target::label("FAR")) };
    assert_eq!(encode(&jsr, NEXT, &syms), Ok(0x4900));
    let jsr = Instruction::Jsr { target: JsrTarget::Pc(Target::label("BACK")) };
    assert_eq!(encode(&jsr, NEXT, &syms), Ok(0x4C00));
}

#[test]
fn jsr_offsets_past_eleven_bits_are_rejected() {
    let syms = SymbolTable::from_iter([("AHEAD", NEXT + 1024), ("BEHIND", NEXT - 1025)]);
    let jsr = Instruction::Jsr { target: JsrTarget::Pc(Target::label("AHEAD")) };
    assert_eq!(
        encode(&jsr, NEXT, &syms),
        Err(EncodeError::OffsetOutOfRange { label: "AHEAD".into(), offset: 1024, bits: 11 })
    );
    let jsr = Instruction::Jsr { target: JsrTarget::Pc(Target::label("BEHIND")) };
    assert_eq!(
        encode(&jsr, NEXT, &syms),
        Err(EncodeError::OffsetOutOfRange { label: "BEHIND".into(), offset: -1025, bits: 11 })
    );
    assert_eq!(jsr.label(), Some("BEHIND"));
    assert_eq!(jsr.pc_offset(), None);
}

#[test]
fn wrap_mode_keeps_low_bits() {
    let syms = SymbolTable::from_iter([("FAR", NEXT + 256)]);
    let far = Instruction::Ld { register: r(5), target: Target::label("FAR") };
    let enc = Encoder::new(OffsetCheck::Wrap);
    assert_eq!(enc.encode(&far, NEXT, &syms), Ok(0x2B00));
}

#[test]
fn pc_distance_wraps_around_memory() {
    let syms = SymbolTable::from_iter([("LOW", 0x0001)]);
    let br = Instruction::Br { condition_code: Cond::all(), target: Target::label("LOW") };
    assert_eq!(encode(&br, 0xFFFF, &syms), Ok(0x0E02));
}

#[test]
fn caller_supplied_fields_are_validated() {
    let syms = SymbolTable::new();
    let add = Instruction::Add { dest_reg: r(0), src_reg1: r(0), src2: AluSrc::Immediate(16) };
    assert_eq!(
        encode(&add, 0, &syms),
        Err(EncodeError::InvalidFieldValue { field: "immediate", value: 16, bits: 5 })
    );
    let ldr = Instruction::Ldr { move_reg: r(0), base_reg: r(0), offset: 32 };
    assert_eq!(
        encode(&ldr, 0, &syms),
        Err(EncodeError::InvalidFieldValue { field: "offset", value: 32, bits: 6 })
    );
    let br = Instruction::Br { condition_code: Cond::all(), target: Target::Offset(-257) };
    assert_eq!(
        encode(&br, 0, &syms),
        Err(EncodeError::InvalidFieldValue { field: "offset", value: -257, bits: 9 })
    );
    assert_eq!(
        Reg::new(8),
        Err(EncodeError::InvalidFieldValue { field: "register", value: 8, bits: 3 })
    );
}

#[test]
fn opcode_tables() {
    assert_eq!(opcode::opcode_for("ADD"), Some(Opcode::Add));
    assert_eq!(opcode::opcode_for("ldr"), Some(Opcode::Ldr));
    assert_eq!(opcode::opcode_for("JSRR"), Some(Opcode::Jsr));
    assert_eq!(opcode::opcode_for("ret"), Some(Opcode::Jmp));
    assert_eq!(opcode::opcode_for("HALT"), None);
    assert_eq!(opcode::lookup("RET").map(|d| d.form), Some(Form::Ret));
    assert_eq!(opcode::lookup("jsrr").map(|d| d.form), Some(Form::JsrRegister));

    // aliases never win the inverse lookup
    assert_eq!(Opcode::Jsr.mnemonic(), "JSR");
    assert_eq!(Opcode::Jmp.mnemonic(), "JMP");
    assert_eq!(Opcode::Trap.mnemonic(), "TRAP");

    for d in opcode::TABLE {
        assert_eq!(Opcode::from_bits(d.opcode.bits()), Some(d.opcode));
        assert_eq!(d.opcode.mask() >> 12, d.opcode.bits() as u16);
    }
    assert_eq!(Opcode::from_bits(0xD), None);
    assert!(!Opcode::Rti.is_supported());
    assert!(Opcode::Lea.is_supported());
}
