//! Project-tracking records: tasks, project costs, fixed expenses, statuses
//! and project names.

use serde::{Deserialize, Serialize};

use crate::domain::lenient::{loose_bool, loose_decimal, loose_string, loose_time, record_id};
use crate::domain::{Decimal, RecordId, TimeMs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub project_name: Option<String>,
    /// Name of a [`Status`] record.
    #[serde(default, deserialize_with = "loose_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_time")]
    pub start_date: Option<TimeMs>,
    #[serde(default, deserialize_with = "loose_time")]
    pub due_date: Option<TimeMs>,
    #[serde(default, deserialize_with = "loose_bool")]
    pub completed: Option<bool>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCost {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    pub project_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub budget: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub actual: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_time")]
    pub date: Option<TimeMs>,
}

impl ProjectCost {
    /// Budget minus actual spend, when both are known.
    pub fn variance(&self) -> Option<Decimal> {
        Some(self.budget? - self.actual?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "loose_time")]
    pub due_date: Option<TimeMs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectName {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub color: Option<String>,
}
