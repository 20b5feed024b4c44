//! Table rendering.

use std::io::{self, Write};

use service_core::error::AppError;
use tabled::{builder::Builder, settings::Style};

/// Destination for a titled table of string cells.
pub trait TableSink {
    fn emit(&mut self, title: &str, headers: &[String], rows: &[Vec<String>]) -> Result<(), AppError>;
}

/// Renders tables as box-drawn text into any writer (stdout by default).
pub struct TextTableSink<W: Write> {
    out: W,
}

impl TextTableSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TextTableSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

impl<W: Write> TableSink for TextTableSink<W> {
    fn emit(&mut self, title: &str, headers: &[String], rows: &[Vec<String>]) -> Result<(), AppError> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", render_table(headers, rows))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
