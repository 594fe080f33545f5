//! Two-pass assembly of an already parsed program.
//!
//! Pass 1 walks every block, gives each statement its address and fills the symbol
//! table. Pass 2 encodes each statement against the finished table, so a label may be
//! referenced before (or in a block before) its definition. Both passes keep going after
//! a failure and all problems come back together as [`AsmErrors`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::{Encoder, OffsetCheck};
use crate::error::{AsmError, AsmErrors};
use crate::image::{Image, Segment};
use crate::instruction::Instruction;
use crate::symbols::SymbolTable;

/// One instruction, optionally labeled with the address it lands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub instruction: Instruction,
}

/// A `.orig` .. `.end` region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub start: u16,
    pub instructions: Vec<Statement>,
}

impl CodeBlock {
    pub fn new(start: u16) -> Self {
        Self {
            start,
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(Statement {
            label: None,
            instruction,
        });
        self
    }

    pub fn push_labeled(&mut self, label: impl Into<String>, instruction: Instruction) -> &mut Self {
        self.instructions.push(Statement {
            label: Some(label.into()),
            instruction,
        });
        self
    }

    /// One past the last address, as a 17-bit value so a full block does not wrap.
    fn end(&self) -> u32 {
        self.start as u32 + self.instructions.len() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub blocks: Vec<CodeBlock>,
}

impl Program {
    pub fn new(blocks: Vec<CodeBlock>) -> Self {
        Self { blocks }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsmConfig {
    pub offsets: OffsetCheck,
    /// Accept blocks whose address ranges intersect.
    pub allow_overlap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembled {
    pub image: Image,
    pub symbols: SymbolTable,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    cfg: AsmConfig,
}

impl Assembler {
    pub fn new(cfg: AsmConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &AsmConfig {
        &self.cfg
    }

    pub fn assemble(&self, program: &Program) -> Result<Assembled, AsmErrors> {
        let (symbols, mut errors) = self.layout(program);
        debug!(
            blocks = program.blocks.len(),
            symbols = symbols.len(),
            errors = errors.len(),
            "pass 1 done"
        );

        let encoder = Encoder::new(self.cfg.offsets);
        let mut segments = Vec::with_capacity(program.blocks.len());
        for block in &program.blocks {
            let mut words = Vec::with_capacity(block.instructions.len());
            for (i, stmt) in block.instructions.iter().enumerate() {
                let addr = block.start.wrapping_add(i as u16);
                let next_addr = addr.wrapping_add(1);
                match encoder.encode(&stmt.instruction, next_addr, &symbols) {
                    Ok(word) => words.push(word),
                    Err(source) => errors.push(AsmError::Encode { addr, source }),
                }
            }
            segments.push(Segment {
                origin: block.start,
                words,
            });
        }
        debug!(errors = errors.len(), "pass 2 done");

        if errors.is_empty() {
            Ok(Assembled {
                image: Image { segments },
                symbols,
            })
        } else {
            Err(AsmErrors(errors))
        }
    }

    /// Pass 1: address assignment and symbol table.
    pub fn layout(&self, program: &Program) -> (SymbolTable, Vec<AsmError>) {
        let mut symbols = SymbolTable::new();
        let mut errors = Vec::new();

        for (n, block) in program.blocks.iter().enumerate() {
            if block.end() > 0x1_0000 {
                errors.push(AsmError::BlockOverflow {
                    origin: block.start,
                    len: block.instructions.len(),
                });
            }
            if !self.cfg.allow_overlap && !block.instructions.is_empty() {
                let clash = program.blocks[..n].iter().find(|prev| {
                    !prev.instructions.is_empty()
                        && (block.start as u32) < prev.end()
                        && (prev.start as u32) < block.end()
                });
                if let Some(prev) = clash {
                    errors.push(AsmError::OverlappingBlocks {
                        first: prev.start,
                        second: block.start,
                    });
                }
            }

            let mut cursor = block.start;
            for stmt in &block.instructions {
                if let Some(label) = &stmt.label {
                    if let Err(e) = symbols.insert(label, cursor) {
                        errors.push(e);
                    }
                }
                cursor = cursor.wrapping_add(1);
            }
        }
        (symbols, errors)
    }
}

pub fn assemble(program: &Program) -> Result<Assembled, AsmErrors> {
    Assembler::default().assemble(program)
}
