//! Analysis state machine.
//!
//! `AnalysisController::apply` is the only place that changes the phase.
//! Every transition not listed in `apply` is rejected and logged.
//!
//! ```text
//! Idle | Succeeded | Failed --Submitted--> Validating
//! Validating --ValidationFailed--> Failed
//! Validating --ValidationPassed--> PrimaryInFlight
//! PrimaryInFlight --PrimaryFailed--> Failed
//! PrimaryInFlight --PrimarySucceeded--> Enhancing
//! Enhancing --EnhancementsSettled--> Succeeded
//! Succeeded --EnhancementReplaced--> Succeeded
//! Idle | Succeeded | Failed --Restored--> Succeeded
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::ErrorBody;
use crate::history::AnalysisInputs;
use crate::models::analysis::{CheckType, ContentType, PolicyAnalysisResult};
use crate::models::history::HistoryEntry;
use crate::previews::PreviewSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Validating,
    PrimaryInFlight,
    Enhancing,
    Succeeded,
    Failed,
}

impl AnalysisPhase {
    /// A submission is being processed.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            AnalysisPhase::Validating | AnalysisPhase::PrimaryInFlight | AnalysisPhase::Enhancing
        )
    }
}

/// A regenerated enhancement for the result currently shown.
#[derive(Debug)]
pub enum Enhancement {
    /// `None` when the regeneration produced no image.
    GeneratedImage(Option<String>),
    LifestyleContent(String),
}

#[derive(Debug)]
pub enum AnalysisEvent {
    Submitted,
    ValidationFailed(ErrorBody),
    ValidationPassed {
        inputs: AnalysisInputs,
        previews: PreviewSet,
    },
    PrimarySucceeded(PolicyAnalysisResult),
    PrimaryFailed(ErrorBody),
    EnhancementsSettled(PolicyAnalysisResult),
    EnhancementReplaced(Enhancement),
    Restored {
        entry: Box<HistoryEntry>,
        previews: PreviewSet,
    },
}

impl AnalysisEvent {
    fn name(&self) -> &'static str {
        match self {
            AnalysisEvent::Submitted => "submitted",
            AnalysisEvent::ValidationFailed(_) => "validation_failed",
            AnalysisEvent::ValidationPassed { .. } => "validation_passed",
            AnalysisEvent::PrimarySucceeded(_) => "primary_succeeded",
            AnalysisEvent::PrimaryFailed(_) => "primary_failed",
            AnalysisEvent::EnhancementsSettled(_) => "enhancements_settled",
            AnalysisEvent::EnhancementReplaced(_) => "enhancement_replaced",
            AnalysisEvent::Restored { .. } => "restored",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("event '{event}' is not allowed while {from:?}")]
pub struct TransitionError {
    pub from: AnalysisPhase,
    pub event: &'static str,
}

/// What the UI needs to render the current analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub phase: AnalysisPhase,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_type: Option<CheckType>,
    pub file_names: Vec<String>,
    pub preview_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PolicyAnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug)]
pub struct AnalysisController {
    phase: AnalysisPhase,
    inputs: Option<AnalysisInputs>,
    previews: PreviewSet,
    result: Option<PolicyAnalysisResult>,
    error: Option<ErrorBody>,
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self {
            phase: AnalysisPhase::Idle,
            inputs: None,
            previews: PreviewSet::default(),
            result: None,
            error: None,
        }
    }
}

impl AnalysisController {
    /// Applies `event`, returning the new phase.
    pub fn apply(&mut self, event: AnalysisEvent) -> Result<AnalysisPhase, TransitionError> {
        use AnalysisEvent as E;
        use AnalysisPhase as P;

        let from = self.phase;
        let event_name = event.name();

        let next = match (from, event) {
            (from, E::Submitted) if !from.is_busy() => {
                self.result = None;
                self.error = None;
                P::Validating
            }
            (P::Validating, E::ValidationFailed(error)) => {
                self.error = Some(error);
                P::Failed
            }
            (P::Validating, E::ValidationPassed { inputs, previews }) => {
                self.inputs = Some(inputs);
                self.previews.replace(previews);
                P::PrimaryInFlight
            }
            (P::PrimaryInFlight, E::PrimarySucceeded(result)) => {
                self.result = Some(result);
                P::Enhancing
            }
            (P::PrimaryInFlight, E::PrimaryFailed(error)) => {
                self.result = None;
                self.error = Some(error);
                P::Failed
            }
            (P::Enhancing, E::EnhancementsSettled(result)) => {
                self.result = Some(result);
                P::Succeeded
            }
            (P::Succeeded, E::EnhancementReplaced(update)) => {
                if let Some(result) = self.result.as_mut() {
                    match update {
                        Enhancement::GeneratedImage(image) => result.generated_image = image,
                        Enhancement::LifestyleContent(text) => result.lifestyle_content = Some(text),
                    }
                }
                P::Succeeded
            }
            (from, E::Restored { entry, previews }) if !from.is_busy() => {
                let entry = *entry;
                self.inputs = Some(AnalysisInputs {
                    files: entry.original_files,
                    content: entry.original_content,
                    content_type: entry.original_content_type,
                    check_type: entry.original_check_type,
                });
                self.previews.replace(previews);
                self.result = Some(entry.result);
                self.error = None;
                P::Succeeded
            }
            _ => {
                warn!(?from, event = event_name, "Rejected analysis state transition");
                return Err(TransitionError {
                    from,
                    event: event_name,
                });
            }
        };

        debug!(?from, ?next, event = event_name, "Analysis state transition");
        self.phase = next;
        Ok(next)
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        let inputs = self.inputs.as_ref();
        AnalysisSnapshot {
            phase: self.phase,
            content: inputs.map(|i| i.content.clone()).unwrap_or_default(),
            content_type: inputs.map(|i| i.content_type),
            check_type: inputs.map(|i| i.check_type),
            file_names: inputs
                .map(|i| i.files.iter().map(|f| f.name.clone()).collect())
                .unwrap_or_default(),
            preview_urls: self.previews.urls(),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// Cloneable handle to the process-wide controller. The lock is never held across `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedController {
    inner: Arc<Mutex<AnalysisController>>,
}

impl SharedController {
    fn lock(&self) -> MutexGuard<'_, AnalysisController> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn apply(&self, event: AnalysisEvent) -> Result<AnalysisPhase, TransitionError> {
        self.lock().apply(event)
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.lock().snapshot()
    }
}
