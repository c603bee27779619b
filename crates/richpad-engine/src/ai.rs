//! Bridge to an external text-generation service.
//!
//! The bridge only produces text. Applying it to the document is a separate
//! follow-up the user chooses, carried out by the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::editing::Selection;
use crate::host::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstructionKind {
    Improve,
    Summarize,
    Expand,
    FixGrammar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub instruction_kind: InstructionKind,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub result_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("Select some text first")]
    EmptySelection,

    #[error("AI request failed: {0}")]
    Service(String),

    #[error("AI returned no text")]
    EmptyResult,
}

impl From<HostError> for AiError {
    fn from(err: HostError) -> Self {
        AiError::Service(err.to_string())
    }
}

#[async_trait(?Send)]
pub trait AiService {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResponse, HostError>;
}

pub struct AiBridge<S> {
    service: S,
}

impl<S: AiService> AiBridge<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Sends `source_text` with an instruction and returns the candidate text.
    pub async fn request_transform(
        &self,
        kind: InstructionKind,
        source_text: &str,
    ) -> Result<String, AiError> {
        if source_text.trim().is_empty() {
            return Err(AiError::EmptySelection);
        }
        let request = TransformRequest {
            instruction_kind: kind,
            source_text: source_text.to_string(),
        };
        log::debug!("AI {kind:?} request, {} chars", request.source_text.chars().count());
        let response = self.service.transform(request).await?;
        if response.result_text.trim().is_empty() {
            return Err(AiError::EmptyResult);
        }
        Ok(response.result_text)
    }
}

/// What to do with a ready result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FollowUp {
    /// Overwrite the originally selected range.
    Replace,
    /// Add the result as paragraphs after the selection's block.
    InsertBelow,
}

/// The AI panel. `range` is the selection captured when the panel opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AiPanel {
    #[default]
    Closed,
    /// Open, waiting for the user to pick an instruction.
    Open { ticket: Uuid, range: Selection },
    Pending {
        ticket: Uuid,
        range: Selection,
        kind: InstructionKind,
    },
    Ready {
        ticket: Uuid,
        range: Selection,
        result: String,
    },
    Failed {
        ticket: Uuid,
        range: Selection,
        message: String,
    },
}

impl AiPanel {
    pub fn ticket(&self) -> Option<Uuid> {
        match self {
            AiPanel::Closed => None,
            AiPanel::Open { ticket, .. }
            | AiPanel::Pending { ticket, .. }
            | AiPanel::Ready { ticket, .. }
            | AiPanel::Failed { ticket, .. } => Some(*ticket),
        }
    }

    pub fn range(&self) -> Option<&Selection> {
        match self {
            AiPanel::Closed => None,
            AiPanel::Open { range, .. }
            | AiPanel::Pending { range, .. }
            | AiPanel::Ready { range, .. }
            | AiPanel::Failed { range, .. } => Some(range),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AiPanel::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
