pub mod result_sink;
pub mod sequence_source;
