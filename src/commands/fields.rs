use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde_json::{Value, json};

use crate::SourceCommand;
use crate::commands::{Report, print};
use crate::pattern::{FieldValue, PathPattern};
use crate::sources::{FileSource, PatternSource};
use crate::utils::style::{dim, header, rounded_table, value};

/// Every file with the field values its path decodes to.
///
/// Files that do not fit the template are listed with no values.
pub struct FieldsReport<'a> {
    pattern: Option<&'a PathPattern>,
    rows: Vec<(&'a str, Option<BTreeMap<String, FieldValue>>)>,
}

impl<'a> FieldsReport<'a> {
    pub fn new(source: &'a FileSource) -> Self {
        let pattern = source.pattern();
        let rows = source
            .files()
            .iter()
            .map(|file| {
                let decoded = pattern.and_then(|p| p.reverse_format(file));
                (file.as_str(), decoded)
            })
            .collect();
        Self { pattern, rows }
    }

    fn field_names(&self) -> Vec<&str> {
        self.pattern
            .map(|p| p.fields().iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }
}

impl Report for FieldsReport<'_> {
    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        let Some(pattern) = self.pattern else {
            writeln!(out, "{}", dim("(no path pattern; no fields to decode)"))?;
            return Ok(());
        };

        let names = self.field_names();
        writeln!(out, "{} {}", header("Pattern:"), value(pattern.template()))?;

        let columns = std::iter::once("path").chain(names.iter().copied());
        let rows = self.rows.iter().map(|(file, decoded)| {
            let mut row = vec![file.to_string()];
            row.extend(names.iter().map(|name| {
                match decoded.as_ref().and_then(|fields| fields.get(*name)) {
                    Some(v) => value(v),
                    None => dim("-"),
                }
            }));
            row
        });

        writeln!(out, "{}", rounded_table(columns, rows))?;
        Ok(())
    }

    fn to_json(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|(file, decoded)| json!({ "path": file, "fields": decoded }))
            .collect();
        json!(rows)
    }
}

pub fn run(command: SourceCommand) -> Result<()> {
    let source = command.resolve()?;
    print(&FieldsReport::new(&source), command.format)
}
