// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

// Re-export specific items for convenience
pub use error::{QuizError, QuizResult};
pub use services::quiz::QuizService;
pub use validation::{ValidationReport, validate};
