//! Document-level settings
//!
//! The small subset of the settings part this engine consumes: tab
//! defaults, note numbering formats, and the even/odd header toggle.

use serde::{Deserialize, Serialize};

/// Parsed document settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Default tab stop interval in points.
    pub default_tab_stop: f32,
    /// Distinct headers/footers on even and odd pages.
    pub even_and_odd_headers: bool,
    /// Raw number-format token for footnote references.
    pub footnote_number_format: Option<String>,
    /// Raw number-format token for endnote references.
    pub endnote_number_format: Option<String>,
    pub auto_hyphenation: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            // 720 twentieths of a point.
            default_tab_stop: 36.0,
            even_and_odd_headers: false,
            footnote_number_format: None,
            endnote_number_format: None,
            auto_hyphenation: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tab_stop_is_half_inch() {
        let settings = DocumentSettings::default();
        assert_eq!(settings.default_tab_stop, 36.0);
        assert!(!settings.even_and_odd_headers);
        assert!(settings.footnote_number_format.is_none());
    }
}
