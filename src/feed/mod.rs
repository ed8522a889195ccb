pub mod jpeg;
pub mod task;
