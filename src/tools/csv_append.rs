//! the append-only csv accumulator shared by `parse_csynth` and `bench`
//!
//! a file is created with its header when it is absent or empty, after that rows are only ever
//! appended. existing content is never truncated or rewritten.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use tracing::debug;

/// one csv record, already formatted
pub type Record = Vec<String>;

#[derive(Debug, Clone)]
pub struct CsvAccumulator {
    path: PathBuf,
    header: &'static [&'static str],
}

impl CsvAccumulator {
    pub fn new(path: impl Into<PathBuf>, header: &'static [&'static str]) -> Self {
        Self {
            path: path.into(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &'static [&'static str] {
        self.header
    }

    /// true when the file does not exist yet or has zero length
    pub fn needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }

    /// create the parent directories and write the header if the file is new or empty
    pub fn ensure_header(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("cannot create directory {parent:?}"))?;
            }
        }
        if self.needs_header() {
            debug!("writing header to {:?}", self.path);
            let mut writer = self.open_writer()?;
            writer.write_record(self.header)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// append the rows, writing the header first when needed. returns how many rows were written.
    ///
    /// every row must have exactly as many fields as the header, otherwise nothing is written.
    pub fn append(&self, rows: &[Record]) -> Result<usize> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.header.len())
        {
            return Err(eyre::eyre!(
                "row {i} has {} fields, expected {}: {:?}",
                row.len(),
                self.header.len(),
                row
            ));
        }
        self.ensure_header()?;
        let mut writer = self.open_writer()?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }

    fn open_writer(&self) -> Result<csv::Writer<fs::File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .wrap_err_with(|| format!("cannot open {:?} for appending", self.path))?;
        Ok(csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file))
    }
}
