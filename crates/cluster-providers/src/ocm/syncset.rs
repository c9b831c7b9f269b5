//! Syncset comparison
//!
//! The cluster service returns syncset resources as untyped maps, in the
//! order they were posted. Both sides are normalised through
//! [`DynamicObject`] before they are compared.

use kube::api::DynamicObject;
use serde_json::Value;

fn normalize(resource: &Value) -> Option<Value> {
    let object: DynamicObject = serde_json::from_value(resource.clone()).ok()?;
    serde_json::to_value(object).ok()
}

/// Returns true when `desired` differs from the resources stored remotely
///
/// Resources are compared by position. A length mismatch, a resource that
/// is not a Kubernetes object or any unequal pair counts as a change.
pub fn resources_changed(existing: &[Value], desired: &[Value]) -> bool {
    if existing.len() != desired.len() {
        return true;
    }
    existing.iter().zip(desired).any(|(current, wanted)| {
        match (normalize(current), normalize(wanted)) {
            (Some(current), Some(wanted)) => current != wanted,
            _ => true,
        }
    })
}
