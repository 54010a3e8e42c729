use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TrackedItem;

/// What the extractor pulled out of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub title: String,
    pub price: Decimal,
    pub currency: String,
}

/// A single point-in-time price reading. Replaced wholesale on the next
/// successful extraction for the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub url: TrackedItem,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(item: &TrackedItem, extraction: Extraction, observed_at: DateTime<Utc>) -> Self {
        Self {
            url: item.clone(),
            title: extraction.title,
            price: extraction.price,
            currency: extraction.currency,
            observed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDrop {
    pub item: TrackedItem,
    pub title: String,
    pub currency: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

impl PriceDrop {
    /// Returns a drop event when `current` is strictly cheaper than `previous`.
    pub fn detect(previous: &Observation, current: &Observation) -> Option<Self> {
        if current.price < previous.price {
            Some(Self {
                item: current.url.clone(),
                title: current.title.clone(),
                currency: current.currency.clone(),
                old_price: previous.price,
                new_price: current.price,
            })
        } else {
            None
        }
    }

    pub fn saved(&self) -> Decimal {
        self.old_price - self.new_price
    }

    pub fn percent(&self) -> Decimal {
        if self.old_price.is_zero() {
            return Decimal::ZERO;
        }
        (self.saved() / self.old_price * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl fmt::Display for PriceDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} {} (-{:.2} / -{:.2}%)",
            self.title,
            self.old_price,
            self.new_price,
            self.currency,
            self.saved(),
            self.percent()
        )
    }
}
