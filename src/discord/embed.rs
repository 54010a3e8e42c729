use chrono::Local;
use serde_json::{json, Value};

use crate::config::DiscordConfig;
use crate::models::{PriceDrop, EMOJI_OLD_PRICE, EMOJI_PRICE, EMOJI_QUESTION, EMOJI_SAVED};
use crate::parsers::clean_text;

const MAX_TITLE_LEN: usize = 250;

pub fn create_embed(drop: &PriceDrop, config: &DiscordConfig) -> Value {
    let fields = vec![
        json!({
            "name": format!("{} New price:", EMOJI_PRICE),
            "value": format!("**{} {}**", drop.new_price, drop.currency),
            "inline": true
        }),
        json!({
            "name": format!("{} Was:", EMOJI_OLD_PRICE),
            "value": format!("~~{} {}~~", drop.old_price, drop.currency),
            "inline": true
        }),
        json!({
            "name": format!("{} Saved:", EMOJI_SAVED),
            "value": format!("**{:.2} {} (-{:.2}%)**", drop.saved(), drop.currency, drop.percent()),
            "inline": false
        }),
    ];

    json!({
        "title": build_embed_title(&drop.title),
        "url": drop.item.url(),
        "color": config.color,
        "fields": fields,
        "footer": {
            "text": format!("{} - Detected: {}",
                config.name,
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )
        }
    })
}

fn build_embed_title(title: &str) -> String {
    let title = clean_text(title);

    if title.is_empty() {
        return format!("{} Unknown item", EMOJI_QUESTION);
    }

    // Truncate on a char boundary
    if title.chars().count() > MAX_TITLE_LEN {
        let truncated: String = title.chars().take(MAX_TITLE_LEN).collect();
        format!("{}...", truncated)
    } else {
        title
    }
}
