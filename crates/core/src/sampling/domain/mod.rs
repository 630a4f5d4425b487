pub mod sample;
pub mod sample_schedule;
