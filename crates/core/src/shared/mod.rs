pub mod constants;
pub mod settings;
