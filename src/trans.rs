// SPDX-License-Identifier: MIT
//!
//! Translation capability and prompt construction
//!

use crate::error::Result;

/// System directive sent with every request
pub const SYSTEM_PROMPT: &str = "You are a professional software product translator specialized in Canadian French translations for a healthcare IT audience. You never translate terms within curly brackets and you avoid changing punctuation marks.";

/// Translate a product string to Canadian French
///
/// `terms` are glossary hints, already formatted as `"<term> (<translation>)"`.
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate(&self, text: &str, terms: &[String]) -> Result<String>;
}

/// System + user message pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

impl Prompt {
    pub fn new(text: &str, terms: &[String]) -> Self {
        let user = if terms.is_empty() {
            format!(
                "Translate the following string to Canadian French:\n\nText: {}",
                text
            )
        } else {
            format!(
                "Translate the following string to Canadian French. Ensure you use the appropriate translations for these terms:\n\n{}\n\n{}",
                terms.join("\n"),
                text
            )
        };

        Self {
            system: SYSTEM_PROMPT,
            user,
        }
    }
}
