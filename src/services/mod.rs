pub mod extractor;
pub mod solver;
pub mod submitter;

pub use extractor::{extract_json_object, QuizExtractor};
pub use solver::QuizSolver;
pub use submitter::Submitter;
