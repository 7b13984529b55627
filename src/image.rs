//! Image (glance) client

use anyhow::Result;
use serde_json::Value;

use crate::api::client::ApiClient;

/// Image catalog entry
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub os: String,
    pub status: String,
    pub visibility: String,
}

impl From<&Value> for Image {
    fn from(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string()
        };
        Self {
            id: field("id"),
            name: field("name"),
            os: field("os"),
            status: field("status"),
            visibility: field("visibility"),
        }
    }
}

/// Image client
#[derive(Clone)]
pub struct Images {
    client: ApiClient,
}

impl Images {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List images with the given visibility (`public`, `private`, ...)
    pub async fn list_by_visibility(&self, visibility: &str) -> Result<Vec<Image>> {
        let url = self.client.image_url(&format!(
            "images?visibility={}",
            urlencoding::encode(visibility)
        ));
        let response = self.client.get(&url).await?;

        let images = response
            .get("images")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(Image::from).collect())
            .unwrap_or_default();
        Ok(images)
    }

    /// First public image matching the OS label and status, if any.
    /// Scenarios use this to pick an active boot image.
    pub async fn find(&self, os: &str, status: &str) -> Result<Option<Image>> {
        let images = self.list_by_visibility("public").await?;
        let found = images
            .into_iter()
            .find(|img| img.os == os && img.status == status);

        if found.is_none() {
            tracing::warn!("no {} image in status {}", os, status);
        }
        Ok(found)
    }
}
