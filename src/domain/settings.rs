//! Singleton campaign settings managed by administrators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Campaign-wide dates shown on both dashboards.
///
/// A singleton: updates replace the whole record, no history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminSettings {
    /// Date the token is expected to list.
    pub listing_date: NaiveDate,
    /// Date withdrawals open.
    pub withdrawal_start_date: NaiveDate,
}

impl Default for AdminSettings {
    fn default() -> Self {
        // Epoch placeholders until an admin sets real dates.
        Self {
            listing_date: NaiveDate::default(),
            withdrawal_start_date: NaiveDate::default(),
        }
    }
}
