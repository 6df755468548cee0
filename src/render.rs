//! Headless renderer collaborator
//!
//! Rasterizing markup is not done here. A renderer accepts a compiled,
//! self-contained document and returns an image or PDF of exactly the
//! document's canvas size.

use crate::{CompiledDocument, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl OutputFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedOutput {
    pub fn empty(format: OutputFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            data: Vec::new(),
        }
    }
}

pub trait Renderer: Send + Sync {
    fn render(&self, document: &CompiledDocument, format: OutputFormat) -> Result<RenderedOutput>;
}

/// Noop renderer that records the digest of every document it was handed
#[derive(Debug, Default)]
pub struct NoopRenderer {
    rendered: std::sync::Mutex<Vec<String>>,
}

impl NoopRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Digests of rendered documents, in call order
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Renderer for NoopRenderer {
    fn render(&self, document: &CompiledDocument, format: OutputFormat) -> Result<RenderedOutput> {
        if let Ok(mut g) = self.rendered.lock() {
            g.push(document.digest());
        }
        log::debug!(
            "noop render of '{}' as {} at {}x{}",
            document.schema_id,
            format,
            document.width,
            document.height
        );
        Ok(RenderedOutput::empty(format, document.width, document.height))
    }
}
