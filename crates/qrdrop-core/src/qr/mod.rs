//! QR code generation for access URLs.
//!
//! Phones on the same network scan the code printed in the terminal to
//! open the download link directly.
//!
//! ## Example
//!
//! ```rust,ignore
//! use qrdrop_core::qr::AccessQr;
//!
//! let qr = AccessQr::new("http://192.168.1.5:8989/video.mp4")?;
//! println!("{}", qr.to_ascii());
//! ```

use qrcode::render::unicode;
use qrcode::{EcLevel, QrCode};

use crate::error::{Error, Result};

/// Configuration for QR code generation.
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Error correction level (default: Medium)
    pub error_correction: EcLevel,
    /// Draw dark modules as light cells, for dark terminal backgrounds
    pub invert: bool,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            error_correction: EcLevel::M,
            invert: true,
        }
    }
}

/// A QR code encoding an access URL.
pub struct AccessQr {
    code: QrCode,
    invert: bool,
}

impl std::fmt::Debug for AccessQr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessQr")
            .field("width", &self.code.width())
            .field("invert", &self.invert)
            .finish()
    }
}

impl AccessQr {
    /// Encode `url` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not fit in a QR code.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, &QrConfig::default())
    }

    /// Encode `url` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not fit in a QR code.
    pub fn with_config(url: &str, config: &QrConfig) -> Result<Self> {
        let code = QrCode::with_error_correction_level(url, config.error_correction)
            .map_err(|e| Error::QrGeneration(e.to_string()))?;
        Ok(Self {
            code,
            invert: config.invert,
        })
    }

    /// Render as compact Unicode half-block art for terminal display.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let (dark, light) = if self.invert {
            (unicode::Dense1x2::Light, unicode::Dense1x2::Dark)
        } else {
            (unicode::Dense1x2::Dark, unicode::Dense1x2::Light)
        };

        self.code
            .render::<unicode::Dense1x2>()
            .dark_color(dark)
            .light_color(light)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://192.168.1.5:8989/video.mp4";

    #[test]
    fn test_to_ascii_not_empty() {
        let qr = AccessQr::new(URL).unwrap().to_ascii();
        assert!(!qr.is_empty());
        assert!(qr.contains('█') || qr.contains('▀') || qr.contains('▄'));
    }

    #[test]
    fn test_to_ascii_multiline() {
        let qr = AccessQr::new(URL).unwrap().to_ascii();
        assert!(qr.lines().count() > 5);
    }

    #[test]
    fn test_different_urls_produce_different_qrs() {
        let qr1 = AccessQr::new(URL).unwrap().to_ascii();
        let qr2 = AccessQr::new("http://192.168.1.6:8989/video.mp4")
            .unwrap()
            .to_ascii();
        assert_ne!(qr1, qr2);
    }

    #[test]
    fn test_invert_changes_rendering() {
        let normal = AccessQr::with_config(
            URL,
            &QrConfig {
                invert: false,
                ..Default::default()
            },
        )
        .unwrap();
        let inverted = AccessQr::new(URL).unwrap();
        assert_eq!(normal.code.width(), inverted.code.width());
        assert_ne!(normal.to_ascii(), inverted.to_ascii());
    }

    #[test]
    fn test_oversized_payload_fails() {
        let huge = "x".repeat(8000);
        let err = AccessQr::new(&huge).unwrap_err();
        assert!(matches!(err, Error::QrGeneration(_)));
    }
}
