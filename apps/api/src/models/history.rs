use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::{CheckType, ComplianceStatus, ContentType, PolicyAnalysisResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFile {
    pub name: String,
    pub data_url: String,
}

/// A cached analysis plus the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub status: ComplianceStatus,
    pub result: PolicyAnalysisResult,
    pub original_files: Vec<HistoryFile>,
    pub original_content: String,
    pub original_content_type: ContentType,
    pub original_check_type: CheckType,
}
