use std::fmt;

use crate::decoder::Decoder;
use crate::image::Image;
use crate::instruction::{Instruction, Target};
use crate::symbols::SymbolTable;

/// Replace a numeric PC-relative offset with the label defined at its target, if any.
pub fn symbolize(instr: &Instruction, next_addr: u16, symbols: &SymbolTable) -> Instruction {
    let mut out = instr.clone();
    let label = instr
        .target_address(next_addr)
        .and_then(|addr| symbols.label_at(addr));
    if let (Some(label), Some(target)) = (label, out.target_mut()) {
        *target = Target::label(label);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub addr: u16,
    pub word: u16,
    /// Label defined at `addr`.
    pub label: Option<String>,
    pub text: String,
}

impl Line {
    pub fn render(&self, show_word: bool) -> String {
        let mut s = format!("x{:04X}: ", self.addr);
        if show_word {
            s.push_str(&format!("{:04X}  ", self.word));
        }
        if let Some(label) = &self.label {
            s.push_str(label);
            s.push_str(": ");
        }
        s.push_str(&self.text);
        s
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// One line per word. Words that do not decode are shown as `.FILL`.
pub fn disassemble<D: Decoder>(
    dec: &D,
    origin: u16,
    words: &[u16],
    symbols: Option<&SymbolTable>,
) -> Vec<Line> {
    words
        .iter()
        .enumerate()
        .map(|(i, &word)| {
            let addr = origin.wrapping_add(i as u16);
            let text = match dec.decode(word) {
                Ok(instr) => match symbols {
                    Some(syms) => symbolize(&instr, addr.wrapping_add(1), syms).to_string(),
                    None => instr.to_string(),
                },
                Err(e) => {
                    tracing::debug!(addr = format_args!("{addr:#06x}"), error = %e, "not an instruction");
                    format!(".FILL x{word:04X}")
                }
            };
            Line {
                addr,
                word,
                label: symbols.and_then(|s| s.label_at(addr)).map(str::to_string),
                text,
            }
        })
        .collect()
}

pub fn disassemble_image<D: Decoder>(
    dec: &D,
    image: &Image,
    symbols: Option<&SymbolTable>,
) -> Vec<Line> {
    image
        .segments
        .iter()
        .flat_map(|s| disassemble(dec, s.origin, &s.words, symbols))
        .collect()
}
