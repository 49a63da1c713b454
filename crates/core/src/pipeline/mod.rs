pub mod batch_executor;
pub mod evaluate_reading_use_case;
pub mod evaluation_logger;
pub mod infrastructure;
