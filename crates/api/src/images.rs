//! Local-filesystem [`ImageStore`].
//!
//! Uploads (raw bytes or a remote URL fetched with `reqwest`) are decoded,
//! downscaled to fit [`MAX_DIMENSION`], re-encoded as JPEG and written under
//! the configured image directory. The router serves that directory at
//! `/images`, so the public URL is `{IMAGE_PUBLIC_URL}/{key}`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageFormat;
use lacquer_core::image::{key_from_reference, storage_key, ImageError, ImageSource, ImageStore};

/// Longest edge of a stored image, in pixels.
pub const MAX_DIMENSION: u32 = 1200;

/// JPEG quality for re-encoded images.
const JPEG_QUALITY: u8 = 85;

/// Timeout for fetching a remote image.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Formats accepted as input.
const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Decode, downscale and re-encode an image as JPEG.
///
/// CPU-bound; call from `spawn_blocking`.
pub fn process_image(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let format = image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(ImageError::UnsupportedFormat);
    }

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::Processing(e.to_string()))?;
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut out: Vec<u8> = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Processing(e.to_string()))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// LocalImageStore
// ---------------------------------------------------------------------------

pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
    client: reqwest::Client,
}

impl LocalImageStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        max_bytes: usize,
    ) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ImageError::Fetch(e.to_string()))?;
        Ok(Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
            client,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn check_size(&self, size: usize) -> Result<(), ImageError> {
        if size > self.max_bytes {
            return Err(ImageError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ImageError::Fetch(format!("Not an http(s) URL: {url}")));
        }

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ImageError::Fetch(e.to_string()))?;

        if let Some(length) = response.content_length() {
            self.check_size(usize::try_from(length).unwrap_or(usize::MAX))?;
        }

        // Content-Length may be absent or wrong; stop reading at the limit.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageError::Fetch(e.to_string()))?
        {
            self.check_size(body.len() + chunk.len())?;
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Whether a reference is an absolute URL outside this store.
    fn is_foreign(&self, reference: &str) -> bool {
        reference.contains("://") && !reference.starts_with(&self.public_base_url)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, source: ImageSource, hint: &str) -> Result<String, ImageError> {
        let bytes = match source {
            ImageSource::Bytes(bytes) => bytes,
            ImageSource::RemoteUrl(url) => self.fetch(&url).await?,
        };
        self.check_size(bytes.len())?;

        let encoded = tokio::task::spawn_blocking(move || process_image(&bytes))
            .await
            .map_err(|e| ImageError::Processing(e.to_string()))??;

        let key = storage_key(hint, "jpg");
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&key), &encoded).await?;

        tracing::info!(key = %key, bytes = encoded.len(), "Image stored");
        Ok(self.public_url(&key))
    }

    async fn remove(&self, url_or_key: &str) -> Result<(), ImageError> {
        if self.is_foreign(url_or_key) {
            tracing::debug!(reference = url_or_key, "Skipping removal of external image");
            return Ok(());
        }

        let key = key_from_reference(url_or_key, &self.public_base_url)?;
        match tokio::fs::remove_file(self.root.join(&key)).await {
            Ok(()) => {
                tracing::info!(key = %key, "Image removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
