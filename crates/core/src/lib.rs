pub mod pipeline;
pub mod reading;
pub mod shared;
