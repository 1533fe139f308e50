// DNAC response and request types
//
// Intent API responses are mostly wrapped in `{ "response": ... }`. Fields
// use `#[serde(default)]` liberally because payloads vary across releases;
// unmodelled fields land in `extra` where callers may want to print them.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Standard intent API envelope: `{ "response": ..., "version": "1.0" }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: T,
}

/// `{ "taskId": ..., "url": ... }` returned by asynchronous operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

// ── Inventory ────────────────────────────────────────────────────────

/// Network device from `/dna/intent/api/v1/network-device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    pub id: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub management_ip_address: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub reachability_status: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Device detail from `/dna/intent/api/v1/device-detail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    pub nw_device_id: String,
    #[serde(default)]
    pub nw_device_name: Option<String>,
    #[serde(default)]
    pub management_ip_addr: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-device health entry from `/dna/intent/api/v1/device-health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHealth {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub overall_health: Option<i64>,
    #[serde(default)]
    pub reachability_health: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body entry for `DELETE /api/v1/inventory/delete/bulk`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDelete {
    pub instance_uuid: String,
    pub clean_config: bool,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site from `/dna/intent/api/v1/site`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site_name_hierarchy: String,
    #[serde(default)]
    pub additional_info: Vec<SiteAdditionalInfo>,
}

/// One `additionalInfo` entry; `attributes.type` marks buildings and floors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAdditionalInfo {
    #[serde(default)]
    pub name_space: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Site {
    /// The `attributes.type` values found across `additionalInfo`.
    pub fn location_types(&self) -> impl Iterator<Item = &str> {
        self.additional_info
            .iter()
            .filter_map(|info| info.attributes.get("type"))
            .filter_map(serde_json::Value::as_str)
    }
}

// ── PnP ──────────────────────────────────────────────────────────────

/// Device in the plug-and-play portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnpDevice {
    pub id: String,
    #[serde(default)]
    pub device_info: PnpDeviceInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnpDeviceInfo {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub onb_state: Option<String>,
}

/// Key/value pair substituted into an onboarding template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigParameter {
    pub key: String,
    pub value: String,
}

/// Body for `POST /api/v1/onboarding/pnp-device/site-claim`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteClaimRequest {
    pub site_id: String,
    pub device_id: String,
    pub hostname: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub image_info: ClaimImageInfo,
    pub config_info: ClaimConfigInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimImageInfo {
    pub image_id: String,
    pub skip: bool,
    pub remove_inactive: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimConfigInfo {
    pub config_id: String,
    pub config_parameters: Vec<ConfigParameter>,
}

// ── Tags ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Network device member of a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMember {
    pub instance_uuid: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub management_ip_address: Option<String>,
}

// ── Credentials ──────────────────────────────────────────────────────

/// Global discovery credential (secrets are never returned by DNAC).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCredential {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

// ── Templates ────────────────────────────────────────────────────────

/// Template summary from `GET /template-programmer/template` (no envelope).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub template_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Deployment target; `type` is always `MANAGED_DEVICE_UUID` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl TargetInfo {
    pub const MANAGED_DEVICE_UUID: &'static str = "MANAGED_DEVICE_UUID";

    pub fn managed_device(id: impl Into<String>, host_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            target_type: Self::MANAGED_DEVICE_UUID.into(),
            host_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployRequest<'a> {
    pub force_push_template: bool,
    pub target_info: &'a [TargetInfo],
    pub template_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployResponse {
    #[serde(default)]
    pub deployment_id: Option<String>,
}

/// Result of `GET /template-programmer/template/deploy/status/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeploymentDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDevice {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detailed_status_message: Option<String>,
}

// ── Tasks / SWIM ─────────────────────────────────────────────────────

/// Task record from `/dna/intent/api/v1/task/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Body entry for `POST /dna/intent/api/v1/image/distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionTarget {
    pub device_uuid: String,
    pub image_uuid: String,
}

/// Body entry for `POST /dna/intent/api/v1/image/activation/device`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationTarget {
    pub activate_lower_image_version: bool,
    pub device_uuid: String,
    pub image_uuid_list: Vec<String>,
}

/// Per-device outcome from `/api/v1/image/task?taskUuid=`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTaskEntry {
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub task_status: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub device_ip: Option<String>,
}

impl ImageTaskEntry {
    pub fn succeeded(&self) -> bool {
        self.task_status == "success"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn site_location_types_reads_attributes() {
        let site: Site = serde_json::from_value(json!({
            "id": "s1",
            "siteNameHierarchy": "Global/US/HQ",
            "additionalInfo": [
                { "nameSpace": "Location", "attributes": { "type": "building", "address": "1 Main" } },
                { "nameSpace": "ETA", "attributes": {} }
            ]
        }))
        .expect("valid site");

        assert_eq!(site.location_types().collect::<Vec<_>>(), vec!["building"]);
    }

    #[test]
    fn target_info_serializes_camel_case() {
        let target = TargetInfo::managed_device("abc", Some("sw1".into()));
        assert_eq!(
            serde_json::to_value(&target).expect("serializes"),
            json!({ "id": "abc", "type": "MANAGED_DEVICE_UUID", "hostName": "sw1" })
        );
    }
}
