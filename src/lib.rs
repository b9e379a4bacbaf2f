pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod records;
pub mod render;
pub mod resolver;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::AnalyticsConfig;
pub use resolver::{DataResolver, Resolution, ResolvedData};
pub use state::AppState;
