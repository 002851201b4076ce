pub mod caches;
pub mod config;
pub mod event_ids;
pub mod event_matcher;
pub mod http_client;
pub mod livetiming;
pub mod meet_matcher;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod session;
pub mod splits;
pub mod tempus;
pub mod text;
