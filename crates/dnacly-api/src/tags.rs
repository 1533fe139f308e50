// Tag endpoints

use serde_json::json;
use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::{Tag, TagMember, TaskHandle};

impl DnacClient {
    /// `GET /dna/intent/api/v1/tag`
    pub async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        self.get("/dna/intent/api/v1/tag", &[]).await
    }

    /// Find a tag by exact name.
    ///
    /// `GET /dna/intent/api/v1/tag?name={name}`
    pub async fn find_tag(&self, name: &str) -> Result<Option<Tag>, Error> {
        let tags: Vec<Tag> = self
            .get("/dna/intent/api/v1/tag", &[("name", name.to_owned())])
            .await?;
        Ok(tags.into_iter().next())
    }

    /// `POST /dna/intent/api/v1/tag` with `{"name": ...}`
    pub async fn create_tag(&self, name: &str) -> Result<TaskHandle, Error> {
        debug!(name, "creating tag");
        self.post("/dna/intent/api/v1/tag", &json!({ "name": name }))
            .await
    }

    /// Attach network devices to a tag.
    ///
    /// `POST /dna/intent/api/v1/tag/{id}/member` with `{"networkdevice": [...]}`
    pub async fn add_tag_members(
        &self,
        tag_id: &str,
        device_ids: &[String],
    ) -> Result<TaskHandle, Error> {
        debug!(tag_id, count = device_ids.len(), "adding tag members");
        self.post(
            &format!("/dna/intent/api/v1/tag/{tag_id}/member"),
            &json!({ "networkdevice": device_ids }),
        )
        .await
    }

    /// Network devices carrying a tag.
    ///
    /// `GET /dna/intent/api/v1/tag/{id}/member?memberType=networkdevice`
    pub async fn tag_members(&self, tag_id: &str) -> Result<Vec<TagMember>, Error> {
        self.get(
            &format!("/dna/intent/api/v1/tag/{tag_id}/member"),
            &[("memberType", "networkdevice".to_owned())],
        )
        .await
    }
}
