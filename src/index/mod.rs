pub mod term;
pub mod inverted;
pub mod score_array;
pub mod vector_retrieval;
