pub mod log_parser;
pub mod subscriber;

pub use log_parser::LogEventParser;
pub use subscriber::LogSubscriber;
