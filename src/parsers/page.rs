use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::str::FromStr;

use super::{clean_text, detect_currency, normalize_currency, parse_price_amount};
use super::{ExtractError, PriceExtractor};
use crate::config::ExtractorConfig;
use crate::models::Extraction;

static JSON_LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid JSON-LD selector")
});

static META_PRICE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="product:price:amount"], meta[property="og:price:amount"], [itemprop="price"]"#,
    )
    .expect("Invalid price meta selector")
});

static META_CURRENCY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="product:price:currency"], meta[property="og:price:currency"], [itemprop="priceCurrency"]"#,
    )
    .expect("Invalid currency meta selector")
});

static META_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("Invalid title meta selector")
});

/// Price found in a page before the fallbacks for title and currency apply.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PriceHit {
    price: Decimal,
    currency: Option<String>,
    title: Option<String>,
}

/// Extractor for ordinary product pages. Tries JSON-LD, then price meta
/// tags, then the configured CSS selectors.
pub struct HtmlPriceExtractor {
    price_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    unavailable_markers: Vec<String>,
    default_currency: String,
}

impl HtmlPriceExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            price_selectors: parse_selectors(&config.price_selectors)?,
            title_selectors: parse_selectors(&config.title_selectors)?,
            unavailable_markers: config
                .unavailable_markers
                .iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
            default_currency: config.default_currency.clone(),
        })
    }

    fn is_unavailable(&self, document: &Html) -> bool {
        if self.unavailable_markers.is_empty() {
            return false;
        }
        let text = visible_text(document).to_lowercase();
        self.unavailable_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    }

    fn price_from_selectors(&self, document: &Html) -> Option<PriceHit> {
        self.price_selectors.iter().find_map(|selector| {
            document.select(selector).find_map(|element| {
                let text = element_value(&element);
                parse_price_amount(&text).map(|price| PriceHit {
                    price,
                    currency: detect_currency(&text),
                    title: None,
                })
            })
        })
    }

    fn title_from_selectors(&self, document: &Html) -> Option<String> {
        self.title_selectors.iter().find_map(|selector| {
            document
                .select(selector)
                .map(|element| clean_text(&element.text().collect::<String>()))
                .find(|title| !title.is_empty())
        })
    }

    pub fn extract_from_document(&self, document: &Html) -> Result<Extraction, ExtractError> {
        if self.is_unavailable(document) {
            return Err(ExtractError::Unavailable);
        }

        let hit = price_from_json_ld(document)
            .or_else(|| price_from_meta(document))
            .or_else(|| self.price_from_selectors(document))
            .filter(|hit| !hit.price.is_sign_negative())
            .ok_or(ExtractError::NotFound)?;

        let title = hit
            .title
            .or_else(|| meta_content(document, &META_TITLE_SELECTOR))
            .or_else(|| self.title_from_selectors(document))
            .unwrap_or_default();

        Ok(Extraction {
            title,
            price: hit.price,
            currency: hit
                .currency
                .unwrap_or_else(|| self.default_currency.clone()),
        })
    }
}

impl PriceExtractor for HtmlPriceExtractor {
    fn extract(&self, content: &str) -> Result<Extraction, ExtractError> {
        let document = Html::parse_document(content);
        self.extract_from_document(&document)
    }
}

/// Text nodes a visitor would see, skipping script and style bodies.
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|element| {
                    matches!(element.name(), "script" | "style" | "noscript" | "template")
                })
            });
            (!hidden).then(|| text.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selectors(raw: &[String]) -> Result<Vec<Selector>> {
    raw.iter()
        .map(|s| Selector::parse(s).map_err(|e| anyhow!("Invalid selector '{}': {:?}", s, e)))
        .collect()
}

fn element_value(element: &ElementRef<'_>) -> String {
    let value = element.value();
    value
        .attr("content")
        .or_else(|| value.attr("data-price"))
        .map(|s| s.to_string())
        .unwrap_or_else(|| clean_text(&element.text().collect::<String>()))
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|element| clean_text(&element_value(&element)))
        .find(|value| !value.is_empty())
}

fn price_from_meta(document: &Html) -> Option<PriceHit> {
    let text = meta_content(document, &META_PRICE_SELECTOR)?;
    let price = parse_price_amount(&text)?;
    let currency = meta_content(document, &META_CURRENCY_SELECTOR)
        .and_then(|c| normalize_currency(&c))
        .or_else(|| detect_currency(&text));

    Some(PriceHit {
        price,
        currency,
        title: None,
    })
}

fn price_from_json_ld(document: &Html) -> Option<PriceHit> {
    document.select(&JSON_LD_SELECTOR).find_map(|script| {
        let raw = script.text().collect::<String>();
        serde_json::from_str::<Value>(raw.trim())
            .ok()
            .and_then(|value| product_in_json(&value))
    })
}

fn has_type(value: &Value, wanted: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn product_in_json(value: &Value) -> Option<PriceHit> {
    match value {
        Value::Array(values) => values.iter().find_map(product_in_json),
        Value::Object(map) => {
            if has_type(value, "Product") {
                let title = map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(clean_text)
                    .filter(|name| !name.is_empty());
                if let Some(mut hit) = map.get("offers").and_then(offer_in_json) {
                    hit.title = title;
                    return Some(hit);
                }
            }
            if has_type(value, "Offer") || has_type(value, "AggregateOffer") {
                if let Some(hit) = offer_in_json(value) {
                    return Some(hit);
                }
            }
            map.get("@graph").and_then(product_in_json)
        }
        _ => None,
    }
}

fn offer_in_json(value: &Value) -> Option<PriceHit> {
    if let Value::Array(offers) = value {
        return offers.iter().find_map(offer_in_json);
    }

    let price = value
        .get("price")
        .or_else(|| value.get("lowPrice"))
        .and_then(json_amount)
        .or_else(|| {
            value
                .get("priceSpecification")
                .and_then(|spec| spec.get("price"))
                .and_then(json_amount)
        })?;

    let currency = value
        .get("priceCurrency")
        .or_else(|| {
            value
                .get("priceSpecification")
                .and_then(|spec| spec.get("priceCurrency"))
        })
        .and_then(Value::as_str)
        .and_then(normalize_currency);

    Some(PriceHit {
        price,
        currency,
        title: None,
    })
}

fn json_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_price_amount(s),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
