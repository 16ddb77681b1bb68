//! Profile lookup, search, editing and avatar upload.

use super::core::{paths, GossipClient};
use crate::envelope::Payload;
use crate::forms::{FormErrors, ProfileUpdate};
use crate::models::{Avatar, Profile, SearchPage};
use crate::transport::{ApiRequest, FilePart};
use crate::Result;
use bytes::Bytes;
use std::path::Path;
use tracing::debug;

/// Multipart field name the server reads the avatar from.
pub const AVATAR_FIELD: &str = "raw_avatar_data";

/// Parameters of `GET /profiles/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
            per_page: 10,
        }
    }
}

/// An image to upload as avatar.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl AvatarUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads an image file, guessing its content type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".to_string());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| image_mime(&e.to_ascii_lowercase()))
            .unwrap_or("application/octet-stream");
        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn validate(&self) -> std::result::Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if !self.content_type.starts_with("image/") {
            errors.add(AVATAR_FIELD, "Please upload an image file");
        } else if self.bytes.is_empty() {
            errors.add(AVATAR_FIELD, "The selected file is empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_part(self) -> FilePart {
        FilePart {
            field: AVATAR_FIELD.to_string(),
            file_name: self.file_name,
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}

fn image_mime(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

impl GossipClient {
    pub async fn search_profiles(&self, query: &SearchQuery) -> Result<SearchPage> {
        let request = ApiRequest::get(paths::PROFILE_SEARCH)
            .query("q", &query.q)
            .query("page", query.page)
            .query("per_page", query.per_page);
        let page: SearchPage = self.execute(request).await?.decode()?;
        debug!(
            q = query.q.as_str(),
            results = page.data.len(),
            total_pages = page.total_pages(),
            "profile search"
        );
        Ok(page)
    }

    /// The profile as its owner sees it.
    pub async fn host_profile(&self, user_id: u64) -> Result<Profile> {
        self.execute(ApiRequest::get(paths::host_profile(user_id)))
            .await?
            .decode()
    }

    /// The profile as another user sees it.
    pub async fn guest_profile(&self, user_id: u64) -> Result<Profile> {
        self.execute(ApiRequest::get(paths::guest_profile(user_id)))
            .await?
            .decode()
    }

    pub async fn avatar(&self, user_id: u64) -> Result<Avatar> {
        self.execute(ApiRequest::get(paths::avatar(user_id)))
            .await?
            .decode()
    }

    pub async fn update_avatar(&self, user_id: u64, upload: AvatarUpload) -> Result<Payload> {
        upload.validate()?;
        debug!(
            user_id,
            file_name = upload.file_name.as_str(),
            size = upload.bytes.len(),
            "uploading avatar"
        );
        let request = ApiRequest::patch(paths::avatar(user_id)).multipart(vec![upload.into_part()]);
        self.execute(request).await
    }

    pub async fn update_profile(&self, user_id: u64, update: &ProfileUpdate) -> Result<Payload> {
        update.validate()?;
        let request = ApiRequest::patch(paths::update_profile(user_id)).json(serde_json::to_value(update)?);
        self.execute(request).await
    }
}
