pub mod image_sequence_reader;
