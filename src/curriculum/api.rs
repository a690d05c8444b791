use reqwest::blocking::multipart;
use tracing::debug;

use super::error::SyncError;
use super::gateway::{AssetKind, CurriculumBackend, HostedAsset, LocalAsset};
use super::model::{CourseId, Curriculum};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// REST backend: curricula under `/curriculum/<course>/`, media uploads
/// under `/uploads/<kind>/`. Every request carries the bearer token.
///
/// JSON calls go through `ureq`; multipart uploads through `reqwest`.
pub struct HttpBackend {
    agent: ureq::Agent,
    uploader: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            agent: ureq::Agent::new(),
            uploader: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn curriculum_url(&self, course_id: &CourseId) -> String {
        format!("{}/curriculum/{}/", self.base_url, course_id)
    }

    fn draft_url(&self, course_id: &CourseId) -> String {
        format!("{}/curriculum/{}/draft/", self.base_url, course_id)
    }

    fn upload_url(&self, kind: AssetKind) -> String {
        format!("{}/uploads/{}/", self.base_url, kind)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        debug!(method, url, "sending request");
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
    }
}

impl CurriculumBackend for HttpBackend {
    fn fetch(&self, course_id: &CourseId) -> Result<Option<Curriculum>, SyncError> {
        let url = self.curriculum_url(course_id);
        let response = match self.request("GET", &url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let body = response.into_string()?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn replace(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError> {
        let url = self.curriculum_url(course_id);
        self.request("PUT", &url).send_json(curriculum)?;
        Ok(())
    }

    fn replace_draft(
        &self,
        course_id: &CourseId,
        curriculum: &Curriculum,
    ) -> Result<(), SyncError> {
        let url = self.draft_url(course_id);
        self.request("POST", &url).send_json(curriculum)?;
        Ok(())
    }

    fn upload(&self, kind: AssetKind, asset: &LocalAsset) -> Result<HostedAsset, SyncError> {
        let part = multipart::Part::bytes(asset.bytes.clone())
            .file_name(asset.file_name.clone())
            .mime_str(&asset.content_type)
            .map_err(|e| SyncError::InvalidAsset(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let url = self.upload_url(kind);
        debug!(method = "POST", url = %url, "sending upload");
        let response = self
            .uploader
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::from_status(status.as_u16()));
        }
        Ok(serde_json::from_slice(&response.bytes()?)?)
    }
}
