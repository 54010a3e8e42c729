pub mod page;
pub mod price;

pub use page::*;
pub use price::*;

use html_escape::decode_html_entities;
use thiserror::Error;

use crate::models::Extraction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no price found on page")]
    NotFound,
    #[error("page reports the item as unavailable")]
    Unavailable,
}

/// Turns raw page content into a structured price reading.
pub trait PriceExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<Extraction, ExtractError>;
}

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
