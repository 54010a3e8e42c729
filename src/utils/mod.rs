pub mod http;
pub mod user_agent;
