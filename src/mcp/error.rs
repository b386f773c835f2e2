//! Tool invocation errors.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::trello::TrelloError;

/// One offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub problem: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

/// Tool input did not match the declared schema.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("Invalid input for {tool}: {}", describe(.issues))]
#[diagnostic(code(trello_mcp::mcp::validation))]
pub struct ValidationError {
    pub tool: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(tool: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self {
            tool: tool.into(),
            issues,
        }
    }

    pub fn single(tool: impl Into<String>, field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new(tool, vec![FieldIssue::new(field, problem)])
    }

    /// Names of the offending fields, in the order they were found.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} {}", i.field, i.problem))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from `ToolRegistry::invoke`.
#[derive(Error, Diagnostic, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    #[diagnostic(code(trello_mcp::mcp::unknown_tool))]
    UnknownTool { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Trello(#[from] TrelloError),
}

pub type ToolResult<T> = Result<T, ToolError>;
