//! Output styling for reporting commands.

use std::fmt::Display;

use owo_colors::{OwoColorize, Style};
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, Style as TableStyle, object::Rows},
};

/// Styles for output text.
pub struct Styles;

impl Styles {
    pub fn header() -> Style {
        Style::new().bold()
    }

    pub fn label() -> Style {
        Style::new().cyan()
    }

    pub fn value() -> Style {
        Style::new().green()
    }

    pub fn dim() -> Style {
        Style::new().dimmed()
    }
}

/// Format a value with label styling.
pub fn label<T: Display>(value: T) -> String {
    value.style(Styles::label()).to_string()
}

/// Format a value with value styling.
pub fn value<T: Display>(v: T) -> String {
    v.style(Styles::value()).to_string()
}

/// Format a value with header styling.
pub fn header<T: Display>(v: T) -> String {
    v.style(Styles::header()).to_string()
}

/// Format a value with dim styling.
pub fn dim<T: Display>(v: T) -> String {
    v.style(Styles::dim()).to_string()
}

/// Build a rounded table whose first record is a bold, centered header.
pub fn rounded_table<H, R>(columns: H, rows: R) -> Table
where
    H: IntoIterator,
    H::Item: Display,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(columns.into_iter().map(header));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table
        .with(TableStyle::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table
}
