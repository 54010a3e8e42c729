pub mod batch;
pub mod item;
pub mod observation;
pub mod state;

pub use batch::*;
pub use item::*;
pub use observation::*;
pub use state::*;

// Emoji constants used in notifications
pub const EMOJI_PRICE: &str = "💰";
pub const EMOJI_OLD_PRICE: &str = "🏷️";
pub const EMOJI_SAVED: &str = "📉";
pub const EMOJI_QUESTION: &str = "❓";
