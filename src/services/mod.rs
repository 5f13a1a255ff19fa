pub mod advisory;
pub mod advisory_log;
pub mod mandi;
pub mod openweather;
pub mod pest;
pub mod speech;
pub mod tables;
pub mod yield_estimate;
