use serde::{Deserialize, Serialize};

use super::task::Priority;

/// Board filter. Absent fields mean "no constraint"; present fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// True iff any constraint is present.
pub fn has_active_filters(criteria: &FilterCriteria) -> bool {
    criteria.search_query.is_some() || criteria.assignee_id.is_some() || criteria.priority.is_some()
}
