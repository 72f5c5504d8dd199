pub mod config;
pub mod error;
pub mod glossary;
pub mod matcher;
pub mod openai;
pub mod pipeline;
pub mod server;
pub mod sheet;
pub mod trans;

// re-export
pub use config::{Config, RowFailurePolicy};
pub use error::{Error, Result};
pub use glossary::{read_glossary, Glossary};
pub use matcher::{find_matches, TermMatch, TermPattern};
pub use openai::OpenAi;
pub use pipeline::{Pipeline, ProductRow, TranslationResult};
pub use trans::{Prompt, Translator};
