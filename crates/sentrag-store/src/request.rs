//! Search request builder.
//!
//! A search carries one or more match clauses. Each clause is a variant of
//! [`MatchClause`], so a text clause can never carry a query vector and a
//! fusion clause never names a field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use sentrag_core::types::{Embedding, SearchMode, SearchQuery};

use crate::error::StoreError;
use crate::schema::{DEFAULT_OUTPUT, DENSE_COLUMN, SCORE_COLUMN, SIMILARITY_COLUMN, TEXT_COLUMN};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    Cosine,
    L2,
    Ip,
}

impl FromStr for MetricType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "l2" => Ok(Self::L2),
            "ip" => Ok(Self::Ip),
            _ => Err(StoreError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cosine => "cosine",
            Self::L2 => "l2",
            Self::Ip => "ip",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMethod {
    /// Reciprocal rank fusion.
    #[default]
    Rrf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[default]
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "match_method", rename_all = "lowercase")]
pub enum MatchClause {
    Text {
        fields: String,
        matching_text: String,
        topn: usize,
        params: BTreeMap<String, String>,
    },
    Dense {
        fields: String,
        query_vector: Embedding,
        element_type: ElementType,
        metric_type: MetricType,
        topn: usize,
        params: BTreeMap<String, String>,
    },
    Fusion {
        fusion_method: FusionMethod,
        topn: usize,
        params: BTreeMap<String, String>,
    },
}

impl MatchClause {
    pub fn text(matching_text: impl Into<String>, topn: usize) -> Self {
        Self::Text {
            fields: TEXT_COLUMN.to_string(),
            matching_text: matching_text.into(),
            topn,
            params: BTreeMap::new(),
        }
    }

    pub fn dense(query_vector: Embedding, metric_type: MetricType, topn: usize) -> Self {
        Self::Dense {
            fields: DENSE_COLUMN.to_string(),
            query_vector,
            element_type: ElementType::Float,
            metric_type,
            topn,
            params: BTreeMap::new(),
        }
    }

    pub fn fusion(fusion_method: FusionMethod, topn: usize) -> Self {
        Self::Fusion { fusion_method, topn, params: BTreeMap::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub search: Vec<MatchClause>,
}

impl SearchRequest {
    /// Build the clauses `mode` calls for from `query`.
    ///
    /// - `Text`: one text clause over the text column
    /// - `Dense`: one dense clause over the vector column
    /// - `Hybrid`: text, dense, then a fusion clause
    pub fn for_query(mode: SearchMode, metric: MetricType, query: &SearchQuery) -> Result<Self, StoreError> {
        let topn = query.top_n;
        let text = || {
            query
                .text
                .as_ref()
                .map(|t| MatchClause::text(t.clone(), topn))
                .ok_or(StoreError::MissingQueryInput { mode, input: "text" })
        };
        let dense = || {
            query
                .vector
                .as_ref()
                .map(|v| MatchClause::dense(v.clone(), metric, topn))
                .ok_or(StoreError::MissingQueryInput { mode, input: "vector" })
        };

        let search = match mode {
            SearchMode::Text => vec![text()?],
            SearchMode::Dense => vec![dense()?],
            SearchMode::Hybrid => vec![text()?, dense()?, MatchClause::fusion(FusionMethod::Rrf, topn)],
        };

        let mut output: Vec<String> = DEFAULT_OUTPUT.iter().map(|c| (*c).to_string()).collect();
        if query.with_score {
            let column = match mode {
                SearchMode::Dense => SIMILARITY_COLUMN,
                SearchMode::Text | SearchMode::Hybrid => SCORE_COLUMN,
            };
            output.push(column.to_string());
        }

        Ok(Self { output, filter: None, search })
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}
