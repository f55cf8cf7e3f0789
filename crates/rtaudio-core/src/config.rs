//! Plugin configuration.
//!
//! Static metadata shared by the host surface and the editor: names,
//! identifiers, the UI entry document and the initial editor size.
//!
//! # Example
//!
//! ```
//! use rtaudio_core::{PluginConfig, Size};
//!
//! pub static CONFIG: PluginConfig = PluginConfig::new("RealTimeAudio", "com.example.rta")
//!     .with_vendor("Example Audio")
//!     .with_version("1.0.0")
//!     .with_editor_size(Size::new(1024, 768));
//!
//! assert_eq!(CONFIG.entry_document, "index.html");
//! ```

use crate::types::Size;

/// Default UI entry document, relative to the bundle's web resources.
pub const DEFAULT_ENTRY_DOCUMENT: &str = "index.html";

/// Plugin metadata, built with `const fn` so it can live in a `static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginConfig {
    /// Plugin name displayed in the DAW.
    pub name: &'static str,

    /// Vendor/company name.
    pub vendor: &'static str,

    /// Vendor URL.
    pub url: &'static str,

    /// Plugin version string.
    pub version: &'static str,

    /// Bundle identifier, passed to the UI runtime at load time.
    pub bundle_id: &'static str,

    /// Document the UI runtime loads on open.
    pub entry_document: &'static str,

    /// Initial editor size in pixels.
    pub editor_size: Size,
}

impl PluginConfig {
    /// Create a configuration with default vendor, version and editor size.
    pub const fn new(name: &'static str, bundle_id: &'static str) -> Self {
        Self {
            name,
            vendor: "Unknown Vendor",
            url: "",
            version: "1.0.0",
            bundle_id,
            entry_document: DEFAULT_ENTRY_DOCUMENT,
            editor_size: Size::new(1024, 768),
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the vendor URL.
    pub const fn with_url(mut self, url: &'static str) -> Self {
        self.url = url;
        self
    }

    /// Set the version string.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Set the UI entry document.
    pub const fn with_entry_document(mut self, document: &'static str) -> Self {
        self.entry_document = document;
        self
    }

    /// Set the initial editor size.
    pub const fn with_editor_size(mut self, size: Size) -> Self {
        self.editor_size = size;
        self
    }

    /// Whether UI runtime diagnostics (inspector, console) are enabled.
    ///
    /// Resolved at build time: on in debug builds, or when the `dev-tools`
    /// feature of this crate is enabled.
    #[inline]
    pub const fn dev_tools(&self) -> bool {
        cfg!(any(debug_assertions, feature = "dev-tools"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: PluginConfig = PluginConfig::new("Test", "com.example.test")
        .with_vendor("Vendor")
        .with_url("https://example.com")
        .with_entry_document("ui/index.html")
        .with_editor_size(Size::new(640, 480));

    #[test]
    fn test_builder() {
        assert_eq!(CONFIG.name, "Test");
        assert_eq!(CONFIG.vendor, "Vendor");
        assert_eq!(CONFIG.url, "https://example.com");
        assert_eq!(CONFIG.version, "1.0.0");
        assert_eq!(CONFIG.entry_document, "ui/index.html");
        assert_eq!(CONFIG.editor_size, Size::new(640, 480));
    }

    #[test]
    fn test_defaults() {
        let config = PluginConfig::new("Test", "id");
        assert_eq!(config.entry_document, DEFAULT_ENTRY_DOCUMENT);
        assert_eq!(config.vendor, "Unknown Vendor");
    }
}
