pub mod config;
pub mod error;
pub mod messages;
pub mod service;
pub mod telemetry;

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorBody, InputError, LocalizedError};
pub use messages::{Locale, Message};
pub use service::{AppState, RECOMMENDATIONS_PATH, build_router, create_app};
pub use telemetry::{LogFormat, init_tracing};
