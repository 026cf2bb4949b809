//! Indentation-tracking line writer for the text-based emitter.

use std::fmt;

/// Accumulates lines of source, prefixing each with the current indentation.
///
/// Blank lines never carry indentation.
///
/// ## Examples
///
/// ```
/// use caefte_gen::codegen::code_writer::CodeWriter;
///
/// let mut w = CodeWriter::with_indent_spaces(4);
/// w.writeln("rng =");
/// w.indented(|w| w.writeln("4"));
/// assert_eq!(w.finish(), "rng =\n    4\n");
/// ```
pub struct CodeWriter {
    out: String,
    indent_level: usize,
    indent_string: String,
}

impl CodeWriter {
    /// Creates a writer indenting with `spaces` spaces per level.
    pub fn with_indent_spaces(spaces: usize) -> Self {
        Self {
            out: String::new(),
            indent_level: 0,
            indent_string: " ".repeat(spaces),
        }
    }

    /// Writes one line at the current indentation.
    pub fn writeln(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent_level {
            self.out.push_str(&self.indent_string);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Formatted variant of [`writeln`](Self::writeln).
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.writeln(&args.to_string());
    }

    /// Writes an empty line.
    pub fn blank_line(&mut self) {
        self.out.push('\n');
    }

    /// Runs `body` one indentation level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent_level += 1;
        body(self);
        self.indent_level -= 1;
    }

    /// Returns the accumulated text.
    pub fn finish(self) -> String {
        self.out
    }
}
