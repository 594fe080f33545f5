use serde::{Deserialize, Serialize};

/// The 4-bit operation field (bits 12..15). `0xD` is reserved and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    Rti = 0x8,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Lea = 0xE,
    Trap = 0xF,
}

/// Sub-encoding pinned by a mnemonic beyond its opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Any,
    /// JSRR: JSR with bit 11 clear.
    JsrRegister,
    /// RET: JMP through R7.
    Ret,
}

#[derive(Debug, Clone, Copy)]
pub struct MnemonicDesc {
    pub mnemonic: &'static str,
    pub opcode: Opcode,
    pub form: Form,
}

const fn desc(mnemonic: &'static str, opcode: Opcode, form: Form) -> MnemonicDesc {
    MnemonicDesc {
        mnemonic,
        opcode,
        form,
    }
}

/// Every mnemonic the assembler knows. The first entry for an opcode is its canonical name.
pub const TABLE: &[MnemonicDesc] = &[
    desc("ADD", Opcode::Add, Form::Any),
    desc("AND", Opcode::And, Form::Any),
    desc("BR", Opcode::Br, Form::Any),
    desc("JMP", Opcode::Jmp, Form::Any),
    desc("JSR", Opcode::Jsr, Form::Any),
    desc("LD", Opcode::Ld, Form::Any),
    desc("LDI", Opcode::Ldi, Form::Any),
    desc("LDR", Opcode::Ldr, Form::Any),
    desc("LEA", Opcode::Lea, Form::Any),
    desc("NOT", Opcode::Not, Form::Any),
    desc("RTI", Opcode::Rti, Form::Any),
    desc("ST", Opcode::St, Form::Any),
    desc("STI", Opcode::Sti, Form::Any),
    desc("STR", Opcode::Str, Form::Any),
    desc("TRAP", Opcode::Trap, Form::Any),
    // aliases
    desc("JSRR", Opcode::Jsr, Form::JsrRegister),
    desc("RET", Opcode::Jmp, Form::Ret),
];

impl Opcode {
    pub fn from_bits(bits: u8) -> Option<Self> {
        use Opcode::*;
        Some(match bits & 0xF {
            0x0 => Br,
            0x1 => Add,
            0x2 => Ld,
            0x3 => St,
            0x4 => Jsr,
            0x5 => And,
            0x6 => Ldr,
            0x7 => Str,
            0x8 => Rti,
            0x9 => Not,
            0xA => Ldi,
            0xB => Sti,
            0xC => Jmp,
            0xE => Lea,
            0xF => Trap,
            _ => return None,
        })
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// The opcode pre-shifted into bits 12..15.
    pub const fn mask(self) -> u16 {
        (self as u16) << 12
    }

    /// Canonical mnemonic; aliases never come back from here.
    pub fn mnemonic(self) -> &'static str {
        TABLE
            .iter()
            .find(|d| d.opcode == self)
            .map_or("???", |d| d.mnemonic)
    }

    /// RTI and TRAP are recognized but neither encoded nor decoded.
    pub fn is_supported(self) -> bool {
        !matches!(self, Opcode::Rti | Opcode::Trap)
    }
}

/// Case-insensitive mnemonic lookup, aliases included.
pub fn lookup(mnemonic: &str) -> Option<&'static MnemonicDesc> {
    TABLE
        .iter()
        .find(|d| d.mnemonic.eq_ignore_ascii_case(mnemonic))
}

pub fn opcode_for(mnemonic: &str) -> Option<Opcode> {
    lookup(mnemonic).map(|d| d.opcode)
}
