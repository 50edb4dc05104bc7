//! Authority-driven status changes.
//!
//! Any status may follow any other, including reopening a resolved
//! complaint; authorities use this to correct mistakes.

use crate::db::{ComplaintStore, StoreError};
use crate::models::{ComplaintRecord, ComplaintStatus};

/// Moves the first record with `complaint_id` to `status` and persists the
/// store. Returns the updated record, or `None` (store untouched) when no
/// record matches.
pub async fn update_status(
    store: &ComplaintStore,
    complaint_id: &str,
    status: ComplaintStatus,
    notes: &str,
) -> Result<Option<ComplaintRecord>, StoreError> {
    let at = super::now();
    let updated = store
        .transact(|records| {
            match records.iter_mut().find(|r| r.complaint_id == complaint_id) {
                Some(rec) => {
                    rec.transition(status, notes, at);
                    (Some(rec.clone()), true)
                }
                None => (None, false),
            }
        })
        .await?;

    match &updated {
        Some(_) => tracing::info!(complaint_id, %status, "complaint status updated"),
        None => tracing::info!(complaint_id, "status update for unknown complaint"),
    }
    Ok(updated)
}
