use std::path::Path;

use miette::{Context, IntoDiagnostic};

mod unique;

pub use unique::{UniqueNames, UniqueNamesScope, words};

/// Writes a unit of generated code under `output`, creating any missing
/// directories.
///
/// The code is written to a temporary file next to its destination, then
/// renamed into place, so an interrupted run never leaves a half-written
/// file behind.
pub fn write_to_disk(output: &Path, code: impl IntoCode) -> miette::Result<()> {
    let code = code.into_code();
    let path = output.join(code.path());
    let contents = code.into_string()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
    }
    let temp = path.with_extension("tmp");
    std::fs::write(&temp, contents)
        .into_diagnostic()
        .with_context(|| format!("Failed to write `{}`", temp.display()))?;
    std::fs::rename(&temp, &path)
        .into_diagnostic()
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(())
}

/// Removes the directory at `output/relative` and everything in it,
/// if it exists.
pub fn clear_dir(output: &Path, relative: &str) -> miette::Result<()> {
    let dir = output.join(relative);
    match std::fs::remove_dir_all(&dir) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err)
            .into_diagnostic()
            .with_context(|| format!("Failed to remove `{}`", dir.display())),
        _ => Ok(()),
    }
}

pub trait Code {
    fn path(&self) -> &str;
    fn into_string(self) -> miette::Result<String>;
}

pub trait IntoCode {
    type Code: Code;

    fn into_code(self) -> Self::Code;
}

impl<T: Code> IntoCode for T {
    type Code = T;

    fn into_code(self) -> Self::Code {
        self
    }
}

/// A named unit of generated source text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceUnit {
    /// The path of the unit, relative to the output directory.
    pub path: String,
    pub contents: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

impl Code for SourceUnit {
    fn path(&self) -> &str {
        &self.path
    }

    fn into_string(self) -> miette::Result<String> {
        Ok(self.contents)
    }
}
