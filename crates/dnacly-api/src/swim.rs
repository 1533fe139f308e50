// Software image management and task endpoints

use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::{ActivationTarget, DistributionTarget, ImageTaskEntry, Task, TaskHandle};

impl DnacClient {
    /// Start distributing an image to a batch of devices.
    ///
    /// `POST /dna/intent/api/v1/image/distribution`
    pub async fn distribute_image(&self, batch: &[DistributionTarget]) -> Result<TaskHandle, Error> {
        debug!(count = batch.len(), "distributing image");
        self.post("/dna/intent/api/v1/image/distribution", batch)
            .await
    }

    /// Activate an image on one device, allowing downgrades.
    ///
    /// `POST /dna/intent/api/v1/image/activation/device`
    pub async fn activate_image(
        &self,
        device_uuid: &str,
        image_uuid: &str,
    ) -> Result<TaskHandle, Error> {
        debug!(device_uuid, "activating image");
        let body = [ActivationTarget {
            activate_lower_image_version: true,
            device_uuid: device_uuid.to_owned(),
            image_uuid_list: vec![image_uuid.to_owned()],
        }];
        self.post("/dna/intent/api/v1/image/activation/device", &body)
            .await
    }

    /// `GET /dna/intent/api/v1/task/{id}`
    pub async fn get_task(&self, task_id: &str) -> Result<Task, Error> {
        self.get(&format!("/dna/intent/api/v1/task/{task_id}"), &[])
            .await
    }

    /// Per-device outcomes of an image task.
    ///
    /// `GET /api/v1/image/task?taskUuid={id}`
    pub async fn image_task_detail(&self, task_id: &str) -> Result<Vec<ImageTaskEntry>, Error> {
        self.get("/api/v1/image/task", &[("taskUuid", task_id.to_owned())])
            .await
    }
}
