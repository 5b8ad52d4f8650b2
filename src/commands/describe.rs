use std::io::Write;

use anyhow::Result;
use serde_json::Value;

use crate::SourceCommand;
use crate::commands::{Report, print};
use crate::sources::{DataSource, FileSource, PathAsPattern, SourceDescription};
use crate::utils::style::{dim, header, label, value};

pub struct DescribeReport {
    description: SourceDescription,
    files: usize,
}

impl DescribeReport {
    pub fn new(source: &FileSource) -> Self {
        Self {
            description: source.describe(),
            files: source.files().len(),
        }
    }
}

impl Report for DescribeReport {
    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        let d = &self.description;
        writeln!(
            out,
            "{} {}",
            header(d.name.as_deref().unwrap_or("(unnamed)")),
            dim(format!("({})", d.driver))
        )?;
        if let Some(description) = &d.description {
            writeln!(out, "{}", description)?;
        }
        writeln!(out)?;

        writeln!(out, "{:<18} {}", label("Urlpath:"), value(&d.args.urlpath))?;
        let path_as_pattern = match &d.args.path_as_pattern {
            PathAsPattern::Flag(flag) => flag.to_string(),
            PathAsPattern::Template(template) => template.clone(),
        };
        writeln!(out, "{:<18} {}", label("Path as pattern:"), value(path_as_pattern))?;
        writeln!(out, "{:<18} {}", label("Files:"), value(self.files))?;

        if d.metadata.is_empty() {
            writeln!(out, "{:<18} {}", label("Metadata:"), dim("(none)"))?;
        } else {
            writeln!(out, "{}", label("Metadata:"))?;
            for (key, v) in &d.metadata {
                writeln!(out, "  {}: {}", key, value(v))?;
            }
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.description).unwrap_or(Value::Null)
    }
}

pub fn run(command: SourceCommand) -> Result<()> {
    let source = command.resolve()?;
    print(&DescribeReport::new(&source), command.format)
}
