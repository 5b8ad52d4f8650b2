use std::io::Write;

use anyhow::Result;
use serde_json::Value;

use crate::SourceCommand;
use crate::commands::{Report, print};
use crate::sources::{DataSource, FileSource, PatternSource, Schema};
use crate::utils::style::{dim, header, label, value};

pub struct SchemaReport<'a> {
    source: &'a FileSource,
    schema: Schema,
}

impl<'a> SchemaReport<'a> {
    pub fn new(source: &'a FileSource) -> Self {
        Self {
            source,
            schema: source.discover(),
        }
    }
}

fn dimension(d: Option<usize>) -> String {
    d.map_or_else(|| "?".to_string(), |d| d.to_string())
}

impl Report for SchemaReport<'_> {
    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        let title = match self.source.name() {
            Some(name) => name.to_string(),
            None => self.source.original_urlpath().to_string(),
        };
        writeln!(out, "{} {}", header(title), dim(format!("({})", self.source.driver())))?;
        writeln!(out)?;

        let shape = format!(
            "({}, {})",
            dimension(self.schema.shape[0]),
            dimension(self.schema.shape[1])
        );
        writeln!(out, "{:<15} {}", label("Shape:"), value(shape))?;
        writeln!(out, "{:<15} {}", label("Partitions:"), value(self.schema.npartitions))?;
        writeln!(
            out,
            "{:<15} {}",
            label("Dtype:"),
            match &self.schema.dtype {
                Some(dtype) => value(dtype),
                None => dim("none"),
            }
        )?;

        if !self.schema.extra_metadata.is_empty() {
            writeln!(out, "{}", label("Extra metadata:"))?;
            for (key, v) in &self.schema.extra_metadata {
                writeln!(out, "  {}: {}", key, value(v))?;
            }
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.schema).unwrap_or(Value::Null)
    }
}

pub fn run(command: SourceCommand) -> Result<()> {
    let source = command.resolve()?;
    print(&SchemaReport::new(&source), command.format)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_schema() {
        let source = FileSource::new(vec!["a.csv", "b.csv", "c.csv"], None, false).unwrap();
        let report = SchemaReport::new(&source);

        assert_eq!(
            report.to_json(),
            json!({
                "datashape": null,
                "dtype": null,
                "shape": [null, 2],
                "npartitions": 3,
                "extra_metadata": {}
            })
        );
    }

    #[test]
    fn test_text_schema() {
        let source = FileSource::new(vec!["a.csv"], None, false)
            .unwrap()
            .with_name("single");
        let mut out = Vec::new();
        SchemaReport::new(&source).render_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("single"));
        assert!(text.contains("(?, 2)"));
        assert!(text.contains("Partitions:"));
    }
}
