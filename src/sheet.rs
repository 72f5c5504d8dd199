// SPDX-License-Identifier: MIT
//!
//! Read CSV / .xlsx tables, write translation results to .xlsx
//!

use crate::error::{Error, Result};
use crate::pipeline::TranslationResult;
use std::path::Path;

/// Output columns, in order
pub const RESULT_HEADERS: [&str; 4] = [
    "Code Location",
    "Product String",
    "Translated String",
    "NB Legend Term(s)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Choose reader from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            // Legacy or non-OOXML workbooks
            Some(ext @ ("xls" | "xlsb" | "ods")) => Err(Error::UnsupportedFormat(format!(
                "{:?}: .{} workbooks are not supported, save as .xlsx or .csv",
                path, ext
            ))),
            _ => Ok(Self::Xlsx),
        }
    }
}

/// One cell, as displayed text
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    /// Cell holds a string, not a number, boolean or error value
    pub is_text: bool,
}

impl Cell {
    pub fn text<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            is_text: true,
        }
    }

    fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Header row and data rows of the first sheet
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Read CSV or .xlsx, dispatched on file extension
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = InputFormat::from_path(path)?;
        if !path.is_file() {
            return Err(Error::ResourceNotFound(format!("{:?}", path)));
        }

        match format {
            InputFormat::Csv => {
                let f = std::fs::File::open(path)?;
                Self::from_csv(f)
            }
            InputFormat::Xlsx => Self::read_xlsx(path),
        }
    }

    /// Parse CSV, first record is the header. Every cell is text.
    pub fn from_csv<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::Parse(e.to_string()))?
            .iter()
            .map(String::from)
            .collect::<Vec<String>>();

        let mut rows = vec![];
        for record in reader.records() {
            let record = record.map_err(|e| Error::Parse(e.to_string()))?;
            rows.push(record.iter().map(Cell::text).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Read first sheet of .xlsx workbook, row 1 is the header
    pub fn read_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| Error::Parse(format!("{:?}: {:?}", path, e)))?;
        let sheet = book
            .get_sheet(&0)
            .ok_or_else(|| Error::Parse(format!("{:?}: workbook has no sheet", path)))?;

        let (max_col, max_row) = sheet.get_highest_column_and_row();
        log::debug!("{:?}: {} columns, {} rows", path, max_col, max_row);

        let headers = (1..=max_col)
            .map(|col| sheet.get_value((col, 1)))
            .collect::<Vec<String>>();
        let rows = (2..=max_row)
            .map(|row| {
                (1..=max_col)
                    .map(|col| xlsx_cell(sheet, col, row))
                    .collect::<Vec<Cell>>()
            })
            .collect();

        Ok(Self::new(headers, rows))
    }

    fn new(headers: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        // Formatted but empty rows at the bottom of a sheet are not data
        while rows
            .last()
            .map_or(false, |row| row.iter().all(Cell::is_blank))
        {
            rows.pop();
        }
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::Schema(format!(
                "column {:?} not found, columns are {:?}",
                name, self.headers
            ))
        })
    }

    /// Cells of the named column, in row order
    ///
    /// Short rows yield empty cells.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map(|c| c.value.as_str()).unwrap_or_default())
            .collect())
    }

    /// Like [`Table::column`], but `None` for blank cells and cells which
    /// do not hold a string
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                row.get(idx)
                    .filter(|c| c.is_text && !c.is_blank())
                    .map(|c| c.value.as_str())
            })
            .collect())
    }
}

fn xlsx_cell(sheet: &umya_spreadsheet::Worksheet, col: u32, row: u32) -> Cell {
    match sheet.get_cell((col, row)) {
        Some(cell) => {
            let is_text = !matches!(cell.get_cell_value().get_data_type(), "n" | "b" | "e");
            Cell {
                value: cell.get_value().to_string(),
                is_text,
            }
        }
        None => Cell::default(),
    }
}

/// Write results to the first sheet of a new .xlsx workbook
pub fn write_results<P: AsRef<Path>>(path: P, results: &[TranslationResult]) -> Result<()> {
    let path = path.as_ref();
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "new workbook has no sheet",
            ))
        })?;

    for (col, header) in (1u32..).zip(RESULT_HEADERS) {
        sheet.get_cell_mut((col, 1)).set_value_string(header);
    }

    for (row, result) in (2u32..).zip(results) {
        sheet
            .get_cell_mut((1, row))
            .set_value_number(result.code_location as f64);
        sheet
            .get_cell_mut((2, row))
            .set_value_string(result.source_text.as_str());
        sheet
            .get_cell_mut((3, row))
            .set_value_string(result.translated_text.as_str());
        if let Some(terms) = &result.legend_terms {
            sheet.get_cell_mut((4, row)).set_value_string(terms.as_str());
        }
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", e))))?;

    log::debug!("Wrote {} rows to {:?}", results.len(), path);
    Ok(())
}
