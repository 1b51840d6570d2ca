//! SQL text rendering
//!
//! Operators and literals unparse themselves through a `SqlWriter`, which
//! exposes list bracketing, separators, and the active target dialect.

/// Target SQL dialect for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Canonical rendering (keyword-prefixed date literals, etc.)
    Ansi,
    /// Dialect without a dedicated date-literal keyword; dates render as
    /// bare quoted strings
    Mssql,
}

/// A bracketed list opened by `start_list` and closed by `end_list`
#[derive(Debug)]
pub struct Frame {
    close: &'static str,
}

/// Rendering collaborator used by operator and literal unparsers
pub trait SqlWriter {
    fn dialect(&self) -> Dialect;

    /// Opens a list scope; `open`/`close` may be empty for a plain grouping
    fn start_list(&mut self, open: &'static str, close: &'static str) -> Frame;

    fn end_list(&mut self, frame: Frame);

    /// Writes a separator attached to the preceding token (e.g. `,`)
    fn sep(&mut self, sep: &str);

    fn keyword(&mut self, keyword: &str);

    fn identifier(&mut self, identifier: &str);

    fn literal(&mut self, text: &str);
}

/// SQL writer that renders into an in-memory string buffer
pub struct SqlTextWriter {
    buf: String,
    dialect: Dialect,
    need_space: bool,
}

impl SqlTextWriter {
    pub fn new(dialect: Dialect) -> Self {
        SqlTextWriter {
            buf: String::new(),
            dialect,
            need_space: false,
        }
    }

    /// Consumes the writer and returns the rendered SQL text
    pub fn into_sql(self) -> String {
        self.buf
    }

    fn token(&mut self, text: &str) {
        if self.need_space && !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(text);
    }
}

impl SqlWriter for SqlTextWriter {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn start_list(&mut self, open: &'static str, close: &'static str) -> Frame {
        if !open.is_empty() {
            self.token(open);
            self.need_space = false;
        }
        Frame { close }
    }

    fn end_list(&mut self, frame: Frame) {
        if !frame.close.is_empty() {
            self.buf.push_str(frame.close);
            self.need_space = true;
        }
    }

    fn sep(&mut self, sep: &str) {
        // Separators attach to the previous token: "c1, c2" not "c1 , c2"
        self.buf.push_str(sep);
        self.need_space = true;
    }

    fn keyword(&mut self, keyword: &str) {
        self.token(keyword);
        self.need_space = true;
    }

    fn identifier(&mut self, identifier: &str) {
        self.token(identifier);
        self.need_space = true;
    }

    fn literal(&mut self, text: &str) {
        self.token(text);
        self.need_space = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_spacing_and_lists() {
        let mut w = SqlTextWriter::new(Dialect::Ansi);
        w.identifier("x");
        w.keyword("AS");
        w.identifier("y");
        let frame = w.start_list("(", ")");
        w.identifier("c1");
        w.sep(",");
        w.identifier("c2");
        w.end_list(frame);
        assert_eq!(w.into_sql(), "x AS y (c1, c2)");
    }

    #[test]
    fn test_empty_frame_is_invisible() {
        let mut w = SqlTextWriter::new(Dialect::Mssql);
        let frame = w.start_list("", "");
        w.identifier("a");
        w.keyword("=");
        w.identifier("b");
        w.end_list(frame);
        assert_eq!(w.dialect(), Dialect::Mssql);
        assert_eq!(w.into_sql(), "a = b");
    }
}
