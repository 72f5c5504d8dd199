// SPDX-License-Identifier: MIT
//!
//! Find glossary terms in a product string
//!

use std::collections::HashMap;

/// Glossary term found in a product string
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermMatch {
    /// English term, as written in the glossary
    pub term: String,
    /// French term
    pub translation: String,
}

impl std::fmt::Display for TermMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.term, self.translation)
    }
}

/// Glossary term with its compiled whole-word pattern
#[derive(Clone, Debug)]
pub struct TermPattern {
    term: String,
    key: String,
    pattern: regex::Regex,
}

impl TermPattern {
    /// Compile `\b<term>\b` for the lowercased, escaped term
    pub fn new<S: Into<String>>(term: S) -> Option<Self> {
        let term = term.into();
        let key = term.to_lowercase();
        match regex::Regex::new(&format!(r"\b{}\b", regex::escape(&key))) {
            Ok(pattern) => Some(Self { term, key, pattern }),
            Err(err) => {
                // Escaped pattern should always compile
                log::warn!("Can not match term {:?} : {}", term, err);
                None
            }
        }
    }

    /// Term as written in the glossary
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Lowercased term, the glossary lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pattern(&self) -> &regex::Regex {
        &self.pattern
    }
}

/// Terms which occur in `product_string` as whole words, case insensitive
///
/// Result keeps the order of `english_terms`. `None` terms are skipped.
/// `glossary` is keyed by lowercased English term.
pub fn find_matches(
    english_terms: &[Option<TermPattern>],
    product_string: &str,
    glossary: &HashMap<String, String>,
) -> Vec<TermMatch> {
    let product_string = product_string.to_lowercase();
    if product_string.is_empty() {
        return vec![];
    }

    english_terms
        .iter()
        .flatten()
        .filter(|term| term.pattern.is_match(&product_string))
        .filter_map(|term| {
            let translation = glossary.get(&term.key)?;
            Some(TermMatch {
                term: term.term.clone(),
                translation: translation.clone(),
            })
        })
        .collect()
}
