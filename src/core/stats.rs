#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStatistics {
    pub document_count: usize,
    pub vocabulary_size: usize,
    pub stop_term_count: usize,
    pub deleted_document_count: usize,
    pub is_indexed: bool,
}
