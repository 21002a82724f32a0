//! Shared id precondition for every service entry point.

use crate::model::EntityKind;
use crate::service::{ServiceError, ServiceResult};
use log::warn;

/// Accepts a present, positive id.
///
/// # Errors
/// - `ServiceError::MissingId` when `value` is `None`.
/// - `ServiceError::NonPositiveId` when `value <= 0`.
pub fn require_id(kind: EntityKind, value: Option<i64>) -> ServiceResult<i64> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(id) => {
            warn!("event=id_rejected module=service status=error kind={kind} reason=non_positive id={id}");
            Err(ServiceError::NonPositiveId { kind, id })
        }
        None => {
            warn!("event=id_rejected module=service status=error kind={kind} reason=missing");
            Err(ServiceError::MissingId(kind))
        }
    }
}
