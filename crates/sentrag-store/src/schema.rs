//! Column names of the documents table.

pub const NAME_COLUMN: &str = "name";
pub const INDEX_COLUMN: &str = "index";
pub const TEXT_COLUMN: &str = "fulltext_column";
pub const DENSE_COLUMN: &str = "dense_column";

/// Relevance of a full-text or fused match.
pub const SCORE_COLUMN: &str = "_score";
/// Relevance of a dense match.
pub const SIMILARITY_COLUMN: &str = "_similarity";

/// Columns requested for every search.
pub const DEFAULT_OUTPUT: [&str; 3] = [NAME_COLUMN, INDEX_COLUMN, TEXT_COLUMN];
