pub mod quiz;

pub use quiz::{QuizDescriptor, QuizRequest};
