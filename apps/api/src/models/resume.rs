use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::model::AnalysisOutcome;

/// A persisted resume upload together with its extracted text and AI analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub parsed_data: ParsedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedData {
    pub raw_text: String,
    pub preview: String,
    /// Length of `raw_text` in characters.
    pub length: usize,
    pub ai_analysis: AiAnalysis,
}

/// The analysis outcome stamped with the time the AI client was invoked.
/// Serializes flat: either the insight fields or `error`, plus `analyzedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    #[serde(rename = "analyzedAt")]
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub parsed_data: Json<ParsedData>,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Resume {
            id: row.id,
            user_id: row.user_id,
            filename: row.filename,
            file_path: row.file_path,
            uploaded_at: row.uploaded_at,
            parsed_data: row.parsed_data.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degraded_resume() -> Resume {
        Resume {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            filename: "cv.pdf".to_string(),
            file_path: "s3://resumes/cv.pdf".to_string(),
            uploaded_at: Utc::now(),
            parsed_data: ParsedData {
                raw_text: "Jane Doe".to_string(),
                preview: "Jane Doe".to_string(),
                length: 8,
                ai_analysis: AiAnalysis {
                    outcome: AnalysisOutcome::Degraded {
                        error: "AI analysis failed after multiple retries".to_string(),
                    },
                    analyzed_at: Utc::now(),
                },
            },
        }
    }

    #[test]
    fn test_resume_serializes_camel_case_record_shape() {
        let value = serde_json::to_value(degraded_resume()).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("filePath").is_some());
        assert!(value.get("uploadedAt").is_some());
        assert!(value["parsedData"].get("rawText").is_some());
        assert_eq!(value["parsedData"]["length"], 8);
    }

    #[test]
    fn test_degraded_analysis_is_flat_error_with_timestamp() {
        let value = serde_json::to_value(degraded_resume()).unwrap();
        let analysis = &value["parsedData"]["aiAnalysis"];
        let keys: Vec<_> = analysis.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2, "unexpected keys: {keys:?}");
        assert_eq!(analysis["error"], "AI analysis failed after multiple retries");
        assert!(analysis["analyzedAt"].is_string());
    }

    #[test]
    fn test_degraded_analysis_survives_storage_round_trip() {
        let resume = degraded_resume();
        let stored = serde_json::to_string(&resume.parsed_data).unwrap();
        let loaded: ParsedData = serde_json::from_str(&stored).unwrap();
        assert_eq!(loaded, resume.parsed_data);
    }
}
