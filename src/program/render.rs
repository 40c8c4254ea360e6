use crate::program::op::Terminal;
use crate::program::{Node, Program};
use std::fmt;

/// Precision used by `Display` when the formatter does not request one.
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

/// Outcome of rendering into a caller-provided byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedText {
    /// Bytes written before the NUL terminator
    pub written: usize,
    /// Whether the text had to be cut to fit
    pub truncated: bool,
}

fn write_node<W: fmt::Write>(out: &mut W, node: &Node, precision: usize) -> fmt::Result {
    match node {
        Node::Terminal(Terminal::Variable(i)) => write!(out, "X{}", i + 1),
        Node::Terminal(Terminal::Constant(c)) => write!(out, "{:.*}", precision, c),
        Node::Function(op, children) => {
            out.write_char('(')?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(out, " {} ", op.symbol())?;
                }
                write_node(out, child, precision)?;
            }
            out.write_char(')')
        }
    }
}

/// Renders a program as fully parenthesized infix text, e.g. `((X1 + 2.00) * X1)`.
/// Variables are numbered from 1.
pub fn render(program: &Program, float_precision: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_node(&mut out, program.root(), float_precision);
    out
}

/// Copies `text` into `out` as a NUL-terminated byte string, truncating instead of overflowing.
/// An empty buffer receives nothing.
pub fn write_truncated(text: &str, out: &mut [u8]) -> RenderedText {
    let Some(capacity) = out.len().checked_sub(1) else {
        return RenderedText {
            written: 0,
            truncated: !text.is_empty(),
        };
    };
    let bytes = text.as_bytes();
    let written = bytes.len().min(capacity);
    out[..written].copy_from_slice(&bytes[..written]);
    out[written] = 0;
    RenderedText {
        written,
        truncated: written < bytes.len(),
    }
}

/// Renders straight into a byte buffer; see [`write_truncated`].
pub fn render_into(program: &Program, float_precision: usize, out: &mut [u8]) -> RenderedText {
    write_truncated(&render(program, float_precision), out)
}

impl fmt::Display for Program {
    /// Honors the formatter precision for constants: `format!("{:.3}", program)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.root(), f.precision().unwrap_or(DEFAULT_FLOAT_PRECISION))
    }
}
