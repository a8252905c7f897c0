//! Image upload hook.
//!
//! Image models can return raw base64 image data. Before the image is put in
//! a message it is handed to an [`ImageUploader`], which turns the bytes into
//! a URL. The default [`DataUrlUploader`] inlines them as a `data:` URL.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mime::Mime;

use crate::error::ModelResult;

/// Turns generated image bytes into a URL usable in a message.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Store `bytes` and return a URL for them.
    async fn upload(&self, bytes: Vec<u8>, mime: &Mime) -> ModelResult<String>;
}

/// Inline images as base64 `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlUploader;

#[async_trait]
impl ImageUploader for DataUrlUploader {
    async fn upload(&self, bytes: Vec<u8>, mime: &Mime) -> ModelResult<String> {
        Ok(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes)))
    }
}
