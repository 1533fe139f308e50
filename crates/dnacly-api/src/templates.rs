// Template programmer endpoints
//
// These endpoints predate the `{ "response": ... }` envelope and return
// their payloads bare.

use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::{DeployRequest, DeployResponse, DeploymentStatus, TargetInfo, Template};

/// Most targets a single deploy request may carry.
pub const MAX_DEPLOY_TARGETS: usize = 99;

impl DnacClient {
    /// `GET /dna/intent/api/v1/template-programmer/template`
    pub async fn list_templates(&self) -> Result<Vec<Template>, Error> {
        self.get_raw("/dna/intent/api/v1/template-programmer/template", &[])
            .await
    }

    /// Deploy a template to a group of devices and return the deployment id.
    ///
    /// `POST /dna/intent/api/v1/template-programmer/template/deploy`
    pub async fn deploy_template(
        &self,
        template_id: &str,
        targets: &[TargetInfo],
    ) -> Result<String, Error> {
        debug!(template_id, count = targets.len(), "deploying template");
        let resp: DeployResponse = self
            .post_raw(
                "/dna/intent/api/v1/template-programmer/template/deploy",
                &DeployRequest {
                    force_push_template: true,
                    target_info: targets,
                    template_id,
                },
            )
            .await?;

        resp.deployment_id
            .as_deref()
            .and_then(deployment_id_from)
            .ok_or(Error::MissingField {
                field: "deploymentId",
            })
    }

    /// `GET /dna/intent/api/v1/template-programmer/template/deploy/status/{id}`
    pub async fn deployment_status(&self, deployment_id: &str) -> Result<DeploymentStatus, Error> {
        self.get_raw(
            &format!("/dna/intent/api/v1/template-programmer/template/deploy/status/{deployment_id}"),
            &[],
        )
        .await
    }
}

/// The deploy endpoint answers with prose such as
/// `"Deployment of  Template: ... ApplicableTargets: [...] Template Deployemnt Id: <uuid>"`;
/// the id is the last whitespace-separated token.
pub fn deployment_id_from(raw: &str) -> Option<String> {
    raw.split_whitespace().last().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_id_is_last_token() {
        let raw = "Deployment of  Template: 6f0c ApplicableTargets: [10.0.0.1] Template Deployemnt Id: 1a2b-3c4d";
        assert_eq!(deployment_id_from(raw).as_deref(), Some("1a2b-3c4d"));
    }

    #[test]
    fn deployment_id_of_blank_is_none() {
        assert_eq!(deployment_id_from("   "), None);
    }
}
