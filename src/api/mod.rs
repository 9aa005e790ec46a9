pub mod gemini_api;
pub mod http_client;
