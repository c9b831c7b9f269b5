//! Addon operations for MockOcmClient

use super::{lock, MockOcmClient};
use crate::error::OcmError;
use crate::models::*;

fn parameter_list(parameters: &[AddOnInstallationParameter]) -> Option<AddOnInstallationParameterList> {
    if parameters.is_empty() {
        None
    } else {
        Some(AddOnInstallationParameterList {
            items: parameters.to_vec(),
        })
    }
}

pub fn get_addon(
    client: &MockOcmClient,
    cluster_id: &str,
    addon_id: &str,
) -> Result<Option<AddOnInstallation>, OcmError> {
    client.record("get_addon")?;
    Ok(lock(&client.addons)
        .get(&(cluster_id.to_string(), addon_id.to_string()))
        .cloned())
}

pub fn create_addon_with_params(
    client: &MockOcmClient,
    cluster_id: &str,
    addon_id: &str,
    parameters: &[AddOnInstallationParameter],
) -> Result<AddOnInstallation, OcmError> {
    client.record("create_addon_with_params")?;

    let key = (cluster_id.to_string(), addon_id.to_string());
    let mut addons = lock(&client.addons);
    if addons.contains_key(&key) {
        return Err(OcmError::Api(format!(
            "addon {} is already installed on cluster {}",
            addon_id, cluster_id
        )));
    }

    let installation = AddOnInstallation {
        id: Some(addon_id.to_string()),
        href: None,
        addon: Some(ObjectReference::with_id(addon_id)),
        state: Some(AddOnInstallationState::Installing),
        parameters: parameter_list(parameters),
    };
    addons.insert(key, installation.clone());
    Ok(installation)
}

pub fn update_addon_parameters(
    client: &MockOcmClient,
    cluster_id: &str,
    addon_installation_id: &str,
    parameters: &[AddOnInstallationParameter],
) -> Result<AddOnInstallation, OcmError> {
    client.record("update_addon_parameters")?;

    let mut addons = lock(&client.addons);
    let installation = addons
        .iter_mut()
        .find(|((cluster, _), i)| cluster == cluster_id && i.id.as_deref() == Some(addon_installation_id))
        .map(|(_, i)| i)
        .ok_or_else(|| {
            OcmError::NotFound(format!(
                "Addon installation {} not found on cluster {}",
                addon_installation_id, cluster_id
            ))
        })?;
    if !parameters.is_empty() {
        installation.parameters = parameter_list(parameters);
    }
    Ok(installation.clone())
}
