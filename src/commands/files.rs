use std::io::Write;

use anyhow::Result;
use serde_json::{Value, json};

use crate::SourceCommand;
use crate::commands::{Report, print};
use crate::sources::FileSource;

/// The file list of a source, one path per line.
pub struct FileList<'a> {
    source: &'a FileSource,
}

impl<'a> FileList<'a> {
    pub fn new(source: &'a FileSource) -> Self {
        Self { source }
    }
}

impl Report for FileList<'_> {
    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        for file in self.source.files() {
            writeln!(out, "{file}")?;
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        json!(self.source.files())
    }
}

pub fn run(command: SourceCommand) -> Result<()> {
    let source = command.resolve()?;
    print(&FileList::new(&source), command.format)
}
