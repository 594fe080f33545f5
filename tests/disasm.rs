use pretty_assertions::assert_eq;

use lc3_core::disasm::{disassemble, disassemble_image, symbolize, Line};
use lc3_core::{
    assemble, decode, AluSrc, CachedDecoder, CodeBlock, Cond, Image, Instruction, Lc3Decoder,
    Program, Reg, SymbolTable, Target,
};

fn text(word: u16) -> String {
    decode(word).unwrap().to_string()
}

#[test]
fn formats_lc3_syntax() {
    assert_eq!(text(0x1C42), "ADD R6, R1, R2");
    assert_eq!(text(0x1A75), "ADD R5, R1, #-11");
    assert_eq!(text(0x5C42), "AND R6, R1, R2");
    assert_eq!(text(0x0402), "BRz #2");
    assert_eq!(text(0x0FFD), "BRnzp #-3");
    assert_eq!(text(0x0000), "NOP");
    assert_eq!(text(0xC140), "JMP R5");
    assert_eq!(text(0xC1C0), "RET");
    assert_eq!(text(0x48AA), "JSR #170");
    assert_eq!(text(0x4140), "JSRR R5");
    assert_eq!(text(0x2AAA), "LD R5, #170");
    assert_eq!(text(0xEAAA), "LEA R5, #170");
    assert_eq!(text(0xBAAA), "STI R5, #170");
    assert_eq!(text(0x6AAA), "LDR R5, R2, #-22");
    assert_eq!(text(0x9ABF), "NOT R5, R2");
}

#[test]
fn label_operands_print_by_name() {
    let i = Instruction::Br { condition_code: Cond::N | Cond::Z, target: Target::label("LOOP") };
    assert_eq!(i.to_string(), "BRnz LOOP");
}

#[test]
fn symbolize_only_touches_labeled_targets() {
    let syms = SymbolTable::from_iter([("ARGLABEL", 0x40AA)]);
    let ld = decode(0x2AAA).unwrap();
    assert_eq!(
        symbolize(&ld, 0x4000, &syms),
        Instruction::Ld { register: Reg::new(5).unwrap(), target: Target::label("ARGLABEL") }
    );
    // no label at 0x40AB
    assert_eq!(symbolize(&ld, 0x4001, &syms), ld);
    let add = Instruction::Add {
        dest_reg: Reg::R0,
        src_reg1: Reg::R0,
        src2: AluSrc::Immediate(1),
    };
    assert_eq!(symbolize(&add, 0x4000, &syms), add);
}

#[test]
fn listing_of_assembled_program() {
    let mut block = CodeBlock::new(0x3000);
    block
        .push_labeled("LOOP", Instruction::Br { condition_code: Cond::Z, target: Target::label("DONE") })
        .push(Instruction::Add {
            dest_reg: Reg::new(1).unwrap(),
            src_reg1: Reg::new(1).unwrap(),
            src2: AluSrc::Immediate(-1),
        })
        .push(Instruction::Br { condition_code: Cond::all(), target: Target::label("LOOP") })
        .push_labeled("DONE", Instruction::Jmp { register: Reg::R7 });
    let out = assemble(&Program::new(vec![block])).unwrap();

    let dec = CachedDecoder::new(Lc3Decoder::new());
    let lines = disassemble_image(&dec, &out.image, Some(&out.symbols));
    let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "x3000: LOOP: BRz DONE",
            "x3001: ADD R1, R1, #-1",
            "x3002: BRnzp LOOP",
            "x3003: DONE: RET",
        ]
    );
    assert_eq!(lines[0].render(true), "x3000: 0402  LOOP: BRz DONE");
}

#[test]
fn undecodable_words_become_fill() {
    let img = Image::from_be_bytes(0x3000, &[0xF0, 0x25, 0x12, 0x61]).unwrap();
    let lines = disassemble(&Lc3Decoder::new(), 0x3000, &img.segments[0].words, None);
    assert_eq!(
        lines,
        vec![
            Line { addr: 0x3000, word: 0xF025, label: None, text: ".FILL xF025".into() },
            Line { addr: 0x3001, word: 0x1261, label: None, text: "ADD R1, R1, #1".into() },
        ]
    );
}
