use std::fmt::Display;

const INDENT: &str = "    ";

/// The header of every generated file.
const PROLOGUE: &str = "\
// swiftformat:disable all
// swiftlint:disable all
// Generated file

import Foundation";

/// Builds Swift source line by line.
#[derive(Debug, Default)]
pub struct SwiftWriter {
    lines: Vec<String>,
    depth: usize,
}

impl SwiftWriter {
    /// Starts a file with the generated-file prologue, and
    /// optionally an `import Moya`.
    pub fn file(moya: bool) -> Self {
        let mut writer = Self::default();
        writer.lines.extend(PROLOGUE.lines().map(str::to_owned));
        if moya {
            writer.line("import Moya");
        }
        writer
    }

    /// Writes a line at the current indentation.
    pub fn line(&mut self, line: impl Display) {
        let line = line.to_string();
        if line.is_empty() {
            self.lines.push(line);
        } else {
            self.lines.push(format!("{}{line}", INDENT.repeat(self.depth)));
        }
    }

    /// Writes an empty line, unless the last line is already empty.
    pub fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Writes `/// ` comment lines for each line of `text`.
    pub fn doc(&mut self, text: &str) {
        for line in text.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format_args!("/// {line}"));
            }
        }
    }

    /// Writes `opener {`, the lines that `body` writes one level deeper,
    /// and a closing `}`.
    pub fn block(&mut self, opener: impl Display, body: impl FnOnce(&mut Self)) {
        self.line(format_args!("{opener} {{"));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        // Drop a trailing empty line inside the block.
        if self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        self.line("}");
    }

    /// Joins the lines, with a trailing newline.
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
