pub mod dataset_sequence;
pub mod fps_summary_writer;
pub mod ground_truth;
pub mod text_result_writer;
