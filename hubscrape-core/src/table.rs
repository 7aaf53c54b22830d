// Result table assembly and persistence

use hubscrape_scanner::ModelRecord;
use indexmap::IndexSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not move output into place at {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Every record collected during a run, in extraction order.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    records: Vec<ModelRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ModelRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ModelRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Union of all field names, in the order they were first seen.
    pub fn columns(&self) -> Vec<String> {
        let columns: IndexSet<&str> = self
            .records
            .iter()
            .flat_map(ModelRecord::field_names)
            .collect();
        columns.into_iter().map(str::to_string).collect()
    }

    /// Writes one header row plus one row per record. Fields a record lacks,
    /// and explicit nulls, are written as `null_marker`.
    ///
    /// A table of nothing but empty records still gets one row per record;
    /// the csv writer renders each field-less row as `""`.
    pub fn write_csv<W: Write>(&self, writer: W, null_marker: &str) -> Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }

        let columns = self.columns();
        if columns.is_empty() {
            warn!(
                "None of the {} records has any field, writing rows without columns",
                self.records.len()
            );
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&columns)?;

        for record in &self.records {
            let row: Vec<String> = columns
                .iter()
                .map(|column| {
                    record
                        .get(column)
                        .map(|value| value.to_cell(null_marker))
                        .unwrap_or_else(|| null_marker.to_string())
                })
                .collect();
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the records as a JSON array of objects. Absent fields are
    /// omitted rather than padded.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }

    /// Writes the whole table to `path` in one step: the data goes to a
    /// temporary file beside `path`, which is then renamed over it.
    pub fn persist(&self, path: &Path, format: OutputFormat, null_marker: &str) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        match format {
            OutputFormat::Csv => self.write_csv(temp.as_file_mut(), null_marker)?,
            OutputFormat::Json => self.write_json(temp.as_file_mut())?,
        }
        temp.as_file_mut().flush()?;

        temp.persist(path).map_err(|e| TableError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl FromIterator<ModelRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ModelRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubscrape_scanner::FieldValue;

    #[test]
    fn test_columns_union_first_seen_order() {
        let mut first = ModelRecord::new();
        first.insert("author", "acme");
        first.insert("model_name", "bert-base");
        let mut second = ModelRecord::new();
        second.insert("model_name", "gpt2");
        second.push_to_list("license", "mit");
        second.insert("author", FieldValue::Null);

        let table: ResultTable = vec![first, second].into_iter().collect();
        assert_eq!(table.columns(), vec!["author", "model_name", "license"]);
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let mut out = Vec::new();
        ResultTable::new().write_csv(&mut out, "").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_all_empty_records_still_write_one_row_each() {
        let table: ResultTable = vec![ModelRecord::new(), ModelRecord::new()]
            .into_iter()
            .collect();
        let mut out = Vec::new();
        table.write_csv(&mut out, "NA").unwrap();

        assert!(!out.is_empty());
        let mut reader = csv::Reader::from_reader(out.as_slice());
        assert_eq!(reader.records().count(), table.row_count());
    }
}
