use std::io::Write;

use anyhow::Result;
use serde_json::{Value, json};

use crate::CatalogCommand;
use crate::catalog::Catalog;
use crate::commands::{Report, print};
use crate::utils::style::{dim, header, rounded_table, value};

pub struct CatalogReport<'a> {
    title: String,
    catalog: &'a Catalog,
}

impl<'a> CatalogReport<'a> {
    pub fn new(title: impl Into<String>, catalog: &'a Catalog) -> Self {
        Self {
            title: title.into(),
            catalog,
        }
    }
}

impl Report for CatalogReport<'_> {
    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "{} {}",
            header(&self.title),
            dim(format!("({} sources)", self.catalog.len()))
        )?;

        if self.catalog.is_empty() {
            return Ok(());
        }

        let rows = self.catalog.entries().map(|(name, entry)| {
            vec![
                value(name),
                entry
                    .description
                    .clone()
                    .unwrap_or_else(|| dim("-")),
                entry.args.urlpath.to_string(),
            ]
        });
        writeln!(out, "{}", rounded_table(["name", "description", "urlpath"], rows))?;
        Ok(())
    }

    fn to_json(&self) -> Value {
        let sources: Vec<Value> = self
            .catalog
            .entries()
            .map(|(name, entry)| {
                json!({
                    "name": name,
                    "description": entry.description,
                    "driver": entry.driver,
                    "args": entry.args,
                    "metadata": entry.metadata,
                })
            })
            .collect();
        json!({ "metadata": self.catalog.metadata, "sources": sources })
    }
}

pub fn run(command: CatalogCommand) -> Result<()> {
    let catalog = Catalog::from_path(&command.file)?;
    let title = command.file.display().to_string();
    print(&CatalogReport::new(title, &catalog), command.format)
}
