pub mod batch_evaluator;
pub mod domain;
pub mod infrastructure;
