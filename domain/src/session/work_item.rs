//! Work items to be estimated

use crate::core::ids::WorkItemId;
use crate::vote::VoteValue;
use serde::{Deserialize, Serialize};

/// An item of work put up for estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to the issue tracker entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    /// Estimate recorded by the moderator; `Empty` until finalized
    #[serde(default)]
    pub agreed_estimate: VoteValue,
}

impl WorkItem {
    pub(crate) fn from_draft(id: WorkItemId, draft: WorkItemDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            external_link: draft.external_link,
            agreed_estimate: VoteValue::Empty,
        }
    }

    pub fn is_estimated(&self) -> bool {
        !self.agreed_estimate.is_empty()
    }
}

/// Fields supplied by the moderator when adding a work item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "linkUrl", skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

impl WorkItemDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            external_link: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = Some(link.into());
        self
    }
}
