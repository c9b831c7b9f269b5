//! Idempotent apply of raw manifests
//!
//! Each object is written with its canonical JSON serialization stored in
//! [`LAST_APPLIED_ANNOTATION`]. An object is pushed again only when the
//! remote copy lacks the annotation or carries a different serialization.

use super::client::{ResolvedResource, ResourceClient};
use crate::error::{ProviderError, Result};
use kube::api::{DynamicObject, GroupVersionKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Annotation holding the last applied configuration of an object
pub const LAST_APPLIED_ANNOTATION: &str = "kas-fleet-manager/last-applied-resource-configuration";

/// Desired object ready to be compared and sent
#[derive(Debug, Clone)]
pub struct PreparedResource {
    /// Group, version and kind from the manifest
    pub gvk: GroupVersionKind,
    /// `metadata.name` of the object
    pub name: String,
    /// `metadata.namespace`, `None` for cluster-scoped objects
    pub namespace: Option<String>,
    /// Canonical serialization of the desired object
    pub fingerprint: String,
    /// Desired object carrying the fingerprint annotation
    pub object: DynamicObject,
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> = map.iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(ordered.into_iter().map(|(k, v)| (k.clone(), v)).collect::<Map<_, _>>())
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Serialize `value` as compact JSON with object keys sorted
pub fn canonical_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&sorted(value))?)
}

fn required_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::InvalidArgument(format!("resource is missing {}", pointer)))
}

/// Parse a desired object and stamp it with its fingerprint
pub fn prepare(desired: &Value) -> Result<PreparedResource> {
    let api_version = required_str(desired, "/apiVersion")?;
    let kind = required_str(desired, "/kind")?;
    let name = required_str(desired, "/metadata/name")?.to_string();

    let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
    let gvk = GroupVersionKind::gvk(group, version, kind);

    let fingerprint = canonical_json(desired)?;
    let mut object: DynamicObject = serde_json::from_value(desired.clone())?;
    object
        .metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(LAST_APPLIED_ANNOTATION.to_string(), fingerprint.clone());
    let namespace = object.metadata.namespace.clone().filter(|ns| !ns.is_empty());

    Ok(PreparedResource {
        gvk,
        name,
        namespace,
        fingerprint,
        object,
    })
}

/// Returns false only when `existing` carries `fingerprint` as its last applied configuration
pub fn should_apply(existing: Option<&DynamicObject>, fingerprint: &str) -> bool {
    let last_applied = existing
        .and_then(|o| o.metadata.annotations.as_ref())
        .and_then(|a| a.get(LAST_APPLIED_ANNOTATION));
    last_applied.is_none_or(|applied| applied != fingerprint)
}

/// Apply one desired object: create it, replace it, or leave it untouched
///
/// Returns the object as stored on the cluster.
pub async fn apply_resource(client: &dyn ResourceClient, desired: &Value) -> Result<DynamicObject> {
    let prepared = prepare(desired)?;
    let resource: ResolvedResource = client.resolve(&prepared.gvk).await?;
    let namespace = prepared.namespace.as_deref();

    let existing = client.get(&resource, namespace, &prepared.name).await?;
    let mut object = prepared.object;
    match existing {
        Some(existing) if !should_apply(Some(&existing), &prepared.fingerprint) => {
            debug!(kind = %prepared.gvk.kind, name = %prepared.name, "Resource unchanged, skipping");
            Ok(existing)
        }
        Some(existing) => {
            info!(kind = %prepared.gvk.kind, name = %prepared.name, "Replacing resource");
            object.metadata.resource_version = existing.metadata.resource_version;
            client.replace(&resource, namespace, &prepared.name, &object).await
        }
        None => {
            info!(kind = %prepared.gvk.kind, name = %prepared.name, "Creating resource");
            client.create(&resource, namespace, &object).await
        }
    }
}
