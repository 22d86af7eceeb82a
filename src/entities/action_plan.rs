//! Action plan entity - corrective action for a non-conforming item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{ActionPlanId, ItemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: ActionPlanId,
    pub item_id: ItemId,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
