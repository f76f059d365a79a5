//! Indented text output

/// Line-oriented writer with two-space indentation
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Write several lines, each at the current indentation
    pub fn lines(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    /// Write an empty line
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Increase indentation
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a `/** … */` doc block
    pub fn doc<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.line("/**");
        for tag in tags {
            let tag = tag.as_ref();
            if tag.is_empty() {
                self.line(" *");
            } else {
                self.line(format!(" * {}", tag));
            }
        }
        self.line(" */");
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Finish and take the text
    pub fn finish(self) -> String {
        self.out
    }
}
