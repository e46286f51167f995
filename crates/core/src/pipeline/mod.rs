pub mod clock;
pub mod frame_record;
pub mod run_logger;
pub mod sequence_runner;
