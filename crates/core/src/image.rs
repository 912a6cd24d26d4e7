//! Polish image references and the image storage contract.
//!
//! A polish image reference is one of three things: `NULL` (never checked),
//! the [`NO_IMAGE_AVAILABLE`] sentinel (checked, confirmed that no image
//! exists) or a public URL produced by an [`ImageStore`].

use async_trait::async_trait;

/// Stored in `polishes.image_url` when an image was looked for and none exists.
pub const NO_IMAGE_AVAILABLE: &str = "no-image-available";

/// Upper bound on accepted upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// True when the reference points at an actual image.
pub fn has_real_image(image_url: Option<&str>) -> bool {
    matches!(image_url, Some(url) if url != NO_IMAGE_AVAILABLE)
}

/// What to store: raw bytes from an upload, or a remote URL to fetch.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    RemoteUrl(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Image is too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to fetch remote image: {0}")]
    Fetch(String),

    #[error("Failed to process image: {0}")]
    Processing(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable image storage.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return its public URL. `hint` names the entity the
    /// image belongs to and is folded into the storage key.
    async fn upload(&self, source: ImageSource, hint: &str) -> Result<String, ImageError>;

    /// Remove an image by public URL or storage key. Removing something that
    /// is already gone is not an error.
    async fn remove(&self, url_or_key: &str) -> Result<(), ImageError>;
}

/// Lowercase ASCII slug of `hint` for use in storage keys.
///
/// Runs of non-alphanumeric characters collapse to a single `-`; an empty
/// result becomes `"image"`.
pub fn slugify_hint(hint: &str) -> String {
    let mut slug = String::with_capacity(hint.len());
    let mut pending_dash = false;
    for c in hint.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}

/// Build a unique storage key such as `opi-red-hot-<uuid>.jpg`.
pub fn storage_key(hint: &str, extension: &str) -> String {
    format!("{}-{}.{extension}", slugify_hint(hint), uuid::Uuid::new_v4())
}

/// Resolve a public URL or bare key to a storage key.
///
/// Keys are a single path segment; anything that would escape the storage
/// root is rejected.
pub fn key_from_reference(reference: &str, public_base_url: &str) -> Result<String, ImageError> {
    let base = public_base_url.trim_end_matches('/');
    let key = reference
        .strip_prefix(base)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(reference);

    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains('/')
        && !key.contains('\\');
    if valid {
        Ok(key.to_string())
    } else {
        Err(ImageError::InvalidKey(reference.to_string()))
    }
}
