pub mod predictions;
pub mod vocabulary;
