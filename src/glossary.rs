// SPDX-License-Identifier: MIT
//!
//! Read the NB Legend glossary from .xlsx
//!

use crate::error::{Error, Result};
use crate::matcher::{self, TermMatch, TermPattern};
use crate::sheet::Table;
use std::collections::HashMap;

/// English -> French term table
#[derive(Debug, Default, Clone)]
pub struct Glossary {
    /// lowercased English term -> French term
    map: HashMap<String, String>,
    /// English terms in file order, compiled once.
    /// `None` for blank or non-string cells.
    terms: Vec<Option<TermPattern>>,
}

impl Glossary {
    /// Build from (English, French) pairs, blank English terms are skipped
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self::from_cells(pairs.into_iter().map(|(en, fr)| (Some(en), fr)))
    }

    /// Build from (English, French) cells, `None` marks a non-string English cell
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = (Option<S>, S)>,
        S: Into<String>,
    {
        let mut glossary = Self::default();
        for (english, french) in cells {
            glossary.push(english.map(Into::into), french.into());
        }
        glossary
    }

    fn push(&mut self, english: Option<String>, french: String) {
        match english.filter(|en| !en.trim().is_empty()).and_then(TermPattern::new) {
            Some(term) => {
                // Last one wins
                self.map.insert(term.key().to_string(), french);
                self.terms.push(Some(term));
            }
            None => self.terms.push(None),
        }
    }

    /// French term for `english`, case insensitive
    pub fn lookup(&self, english: &str) -> Option<&str> {
        self.map.get(&english.to_lowercase()).map(String::as_str)
    }

    pub fn terms(&self) -> &[Option<TermPattern>] {
        &self.terms
    }

    pub fn map(&self) -> &HashMap<String, String> {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Glossary terms found in `text`
    pub fn matches(&self, text: &str) -> Vec<TermMatch> {
        matcher::find_matches(&self.terms, text, &self.map)
    }
}

/// Read glossary from the first sheet of `xlsx_path`
///
/// The sheet must have "English" and "French" header cells.
/// English cells holding numbers, booleans or errors are not terms.
pub fn read_glossary<P: AsRef<std::path::Path>>(xlsx_path: P) -> Result<Glossary> {
    let xlsx_path = xlsx_path.as_ref();
    let table = match Table::read_xlsx(xlsx_path) {
        Ok(table) => table,
        Err(Error::Parse(msg)) | Err(Error::ResourceNotFound(msg)) => {
            return Err(Error::ResourceNotFound(msg))
        }
        Err(err) => return Err(err),
    };

    let english = table.text_column("English")?;
    let french = table.column("French")?;
    let glossary = Glossary::from_cells(english.into_iter().zip(french));

    log::debug!("Read {} glossary terms from {:?}", glossary.len(), xlsx_path);
    Ok(glossary)
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_xlsx(path: &std::path::Path, rows: &[[&str; 2]]) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        for (r, row) in (1u32..).zip(rows) {
            for (c, value) in (1u32..).zip(row) {
                if !value.is_empty() {
                    sheet.get_cell_mut((c, r)).set_value_string(*value);
                }
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    fn term_names(glossary: &Glossary) -> Vec<Option<&str>> {
        glossary
            .terms()
            .iter()
            .map(|t| t.as_ref().map(TermPattern::term))
            .collect()
    }

    #[test]
    fn read_from_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NB Legend.xlsx");
        write_xlsx(
            &path,
            &[
                ["English", "French"],
                ["EHR", "DSE"],
                ["", "orphelin"],
                ["Warfarin", "warfarine"],
            ],
        );

        let glossary = read_glossary(&path).unwrap();
        assert_eq!(glossary.len(), 2);
        assert_eq!(term_names(&glossary), vec![Some("EHR"), None, Some("Warfarin")]);
        assert_eq!(glossary.lookup("ehr"), Some("DSE"));
        assert_eq!(glossary.map().get("warfarin").map(String::as_str), Some("warfarine"));
    }

    #[test]
    fn numeric_english_cell_is_not_a_term() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NB Legend.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("English");
        sheet.get_cell_mut((2, 1)).set_value_string("French");
        sheet.get_cell_mut((1, 2)).set_value_number(911);
        sheet.get_cell_mut((2, 2)).set_value_string("neuf-un-un");
        sheet.get_cell_mut((1, 3)).set_value_bool(true);
        sheet.get_cell_mut((2, 3)).set_value_string("vrai");
        sheet.get_cell_mut((1, 4)).set_value_string("chart");
        sheet.get_cell_mut((2, 4)).set_value_string("dossier");
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let glossary = read_glossary(&path).unwrap();
        assert_eq!(term_names(&glossary), vec![None, None, Some("chart")]);
        assert_eq!(glossary.lookup("911"), None);
        assert!(glossary.matches("call 911 now").is_empty());
        assert!(glossary.matches("TRUE chart").iter().all(|m| m.term == "chart"));
    }

    #[test]
    fn french_column_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legend.xlsx");
        write_xlsx(&path, &[["English", "Français"], ["chart", "dossier"]]);

        assert!(matches!(read_glossary(&path), Err(Error::Schema(_))));
    }

    #[test]
    fn missing_glossary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");

        assert!(matches!(read_glossary(&path), Err(Error::ResourceNotFound(_))));
    }

    #[test]
    fn duplicate_term_last_wins() {
        let glossary = Glossary::from_pairs([("Chart", "graphique"), ("chart", "dossier")]);
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary.terms().len(), 2);
        assert_eq!(glossary.lookup("CHART"), Some("dossier"));
    }
}
