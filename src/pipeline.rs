// SPDX-License-Identifier: MIT
//!
//! Translate every row of an input spreadsheet
//!

use crate::config::{Config, RowFailurePolicy};
use crate::error::{Error, Result};
use crate::glossary::{self, Glossary};
use crate::sheet::{self, Table};
use crate::trans::Translator;
use std::path::{Path, PathBuf};

/// Column holding the strings to translate
pub const SOURCE_COLUMN: &str = "English";

/// File name of the produced workbook
pub const OUTPUT_FILE: &str = "translated_file.xlsx";

/// One row of the input file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductRow {
    /// 0-based data row position
    pub code_location: usize,
    pub source_text: String,
}

/// One row of the output file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationResult {
    pub code_location: usize,
    pub source_text: String,
    pub translated_text: String,
    /// Matched glossary terms, comma separated
    pub legend_terms: Option<String>,
}

pub struct Pipeline<T> {
    translator: T,
    glossary_path: PathBuf,
    output_dir: PathBuf,
    on_row_error: RowFailurePolicy,
}

impl<T: Translator> Pipeline<T> {
    pub fn new(config: &Config, translator: T) -> Self {
        Self {
            translator,
            glossary_path: config.glossary.clone(),
            output_dir: config.output_dir.clone(),
            on_row_error: config.on_row_error,
        }
    }

    /// Translate `input`, returns path of the produced workbook
    ///
    /// Each run writes into its own directory under `output_dir`.
    pub async fn process_file<P: AsRef<Path>>(&self, input: P) -> Result<PathBuf> {
        let run_id = uuid::Uuid::new_v4();
        let output = self
            .output_dir
            .join(run_id.to_string())
            .join(OUTPUT_FILE);
        self.process_file_to(input, &output).await?;
        Ok(output)
    }

    /// Translate `input` into the workbook at `output`
    ///
    /// Nothing is written when the run fails.
    pub async fn process_file_to<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<()> {
        let input = input.as_ref().to_path_buf();
        let output = output.as_ref().to_path_buf();
        log::info!("Translating {:?}", input);

        // Spreadsheet I/O runs on the blocking pool
        let glossary_path = self.glossary_path.clone();
        let read_input = input.clone();
        let (glossary, rows) = blocking(move || {
            let glossary = glossary::read_glossary(&glossary_path)?;
            Ok((glossary, read_rows(&read_input)?))
        })
        .await?;

        let results = self.translate_rows(&glossary, &rows).await?;

        let write_output = output.clone();
        let count = blocking(move || {
            sheet::write_results(&write_output, &results)?;
            Ok(results.len())
        })
        .await?;
        log::info!(
            "Translated {} rows from {:?} to {:?}",
            count,
            input,
            output
        );
        Ok(())
    }

    /// Match glossary terms and translate each row, in order
    pub async fn translate_rows(
        &self,
        glossary: &Glossary,
        rows: &[ProductRow],
    ) -> Result<Vec<TranslationResult>> {
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            let terms: Vec<String> = glossary
                .matches(&row.source_text)
                .iter()
                .map(|m| m.to_string())
                .collect();
            log::debug!(
                "Row {}: {} glossary term(s)",
                row.code_location,
                terms.len()
            );

            let translated_text = match self.translator.translate(&row.source_text, &terms).await
            {
                Ok(text) => text,
                Err(err) if self.on_row_error == RowFailurePolicy::Mark => {
                    log::warn!("Row {} failed: {}", row.code_location, err);
                    format!("[translation failed: {}]", err)
                }
                Err(err) => return Err(err),
            };

            results.push(TranslationResult {
                code_location: row.code_location,
                source_text: row.source_text.clone(),
                translated_text,
                legend_terms: if terms.is_empty() {
                    None
                } else {
                    Some(terms.join(", "))
                },
            });
        }

        Ok(results)
    }
}

/// Run blocking file work off the async task
async fn blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("file task failed: {}", e),
        ))
    })?
}

/// Read "English" column of a CSV or .xlsx file
pub fn read_rows<P: AsRef<Path>>(input: P) -> Result<Vec<ProductRow>> {
    let table = Table::read(input)?;
    Ok(table
        .column(SOURCE_COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(code_location, text)| ProductRow {
            code_location,
            source_text: text.to_string(),
        })
        .collect())
}
