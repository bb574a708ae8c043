//! Prompt template with two substitution points, `{{ context }}` and
//! `{{ user_query }}`.
//!
//! A template is parsed once; rendering a parsed template cannot fail, so a
//! bad template surfaces when the query pipeline is built rather than on the
//! first question.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use sentrag_core::config::{resolve_with_base, QuerySettings};

pub const BUILTIN_TEMPLATE: &str = include_str!("../templates/prompt.txt");

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    #[error("unknown placeholder `{name}` at byte {offset}")]
    UnknownPlaceholder { name: String, offset: usize },

    #[error("template never uses `{{{{ {0} }}}}`")]
    MissingPlaceholder(&'static str),

    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    UserQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template. Both placeholders must appear at least once; inner
    /// whitespace (`{{context}}`, `{{ context }}`) is ignored.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or(TemplateError::Unterminated { offset: offset + start })?;
            let segment = match after_open[..end].trim() {
                "context" => Segment::Context,
                "user_query" => Segment::UserQuery,
                other => {
                    return Err(TemplateError::UnknownPlaceholder {
                        name: other.to_string(),
                        offset: offset + start,
                    })
                }
            };
            segments.push(segment);

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        if !segments.contains(&Segment::Context) {
            return Err(TemplateError::MissingPlaceholder("context"));
        }
        if !segments.contains(&Segment::UserQuery) {
            return Err(TemplateError::MissingPlaceholder("user_query"));
        }
        Ok(Self { segments })
    }

    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&source)
    }

    /// The template shipped with the crate.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::parse(BUILTIN_TEMPLATE)
    }

    /// Load `query.template_path` (relative paths resolve against `base_dir`),
    /// or the built-in template when unset.
    pub fn from_settings(settings: &QuerySettings, base_dir: &Path) -> Result<Self, TemplateError> {
        match &settings.template_path {
            Some(path) => Self::from_file(&resolve_with_base(base_dir, path)),
            None => Self::builtin(),
        }
    }

    pub fn render(&self, context: &str, user_query: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Context => out.push_str(context),
                Segment::UserQuery => out.push_str(user_query),
            }
        }
        out
    }
}
