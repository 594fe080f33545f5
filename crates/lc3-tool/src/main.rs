use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use lc3_core::disasm::disassemble_image;
use lc3_core::{AsmConfig, Assembler, CachedDecoder, Image, Lc3Decoder, OffsetCheck, Program, SymbolTable};

#[derive(Parser, Debug)]
#[command(author, version, about = "LC-3 assembler and disassembler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a parsed program (JSON) into raw big-endian words
    Assemble {
        /// Program JSON as produced by the parser
        #[arg(value_name = "PROGRAM")]
        input: PathBuf,
        /// Output binary (default: input with .bin extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Write the symbol table as JSON
        #[arg(long, value_name = "FILE")]
        symbols: Option<PathBuf>,
        /// Assembler config JSON
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Truncate out-of-range offsets instead of failing
        #[arg(long)]
        wrap_offsets: bool,
        /// Accept overlapping blocks
        #[arg(long)]
        allow_overlap: bool,
    },
    /// Disassemble a raw big-endian word stream
    Disasm {
        #[arg(value_name = "BINFILE")]
        input: PathBuf,
        /// Load address (x3000, 0x3000 or decimal)
        #[arg(long, default_value = "x3000")]
        origin: String,
        /// Symbol table JSON used to name branch targets
        #[arg(long, value_name = "FILE")]
        symbols: Option<PathBuf>,
        /// Show instruction words
        #[arg(long)]
        show_words: bool,
        /// Write the listing to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn parse_addr(s: &str) -> Result<u16> {
    let s = s.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('x'))
        .or_else(|| s.strip_prefix('X'));
    match hex {
        Some(h) => u16::from_str_radix(h, 16).with_context(|| format!("bad address {s:?}")),
        None => s.parse::<u16>().with_context(|| format!("bad address {s:?}")),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Assemble { input, output, symbols, config, wrap_offsets, allow_overlap } => {
            let mut cfg: AsmConfig = match &config {
                Some(path) => read_json(path)?,
                None => AsmConfig::default(),
            };
            if wrap_offsets {
                cfg.offsets = OffsetCheck::Wrap;
            }
            cfg.allow_overlap |= allow_overlap;

            let program: Program = read_json(&input)?;
            let assembled = match Assembler::new(cfg).assemble(&program) {
                Ok(a) => a,
                Err(errors) => {
                    for e in &errors {
                        eprintln!("error: {e}");
                    }
                    anyhow::bail!("assembly failed with {} error(s)", errors.len());
                }
            };
            for s in &assembled.image.segments {
                tracing::info!(origin = format_args!("{:#06x}", s.origin), words = s.words.len(), "block");
            }

            let out = output.unwrap_or_else(|| input.with_extension("bin"));
            std::fs::write(&out, assembled.image.to_be_bytes())
                .with_context(|| format!("writing {}", out.display()))?;
            if let Some(path) = symbols {
                std::fs::write(&path, serde_json::to_string_pretty(&assembled.symbols)?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Command::Disasm { input, origin, symbols, show_words, out } => {
            let origin = parse_addr(&origin)?;
            let bytes = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let img = Image::from_be_bytes(origin, &bytes)?;
            let syms: Option<SymbolTable> = symbols.as_deref().map(read_json::<SymbolTable>).transpose()?;

            let dec = CachedDecoder::new(Lc3Decoder::new());
            let mut buf = String::new();
            for line in disassemble_image(&dec, &img, syms.as_ref()) {
                buf.push_str(&line.render(show_words));
                buf.push('\n');
            }
            if let Some(path) = out { std::fs::write(path, buf)?; } else { print!("{}", buf); }
        }
    }

    Ok(())
}
