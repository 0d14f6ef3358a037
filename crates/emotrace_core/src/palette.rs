//! Presentation lookup: emotion keys and hormone names to display colors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPalette {
    pub key: String,
    pub light: String,
    pub main: String,
    pub dark: String,
    /// CSS color for soft highlights (calendar cells).
    pub glow: String,
    pub chart: String,
    /// Line color per hormone name for this emotion's decay chart.
    #[serde(default)]
    pub hormones: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(rename = "emotion", default)]
    pub emotions: Vec<EmotionPalette>,
}

impl Palette {
    pub fn emotion(&self, key: &str) -> Option<&EmotionPalette> {
        self.emotions.iter().find(|e| e.key == key)
    }

    pub fn hormone_color(&self, emotion: &str, hormone: &str) -> Option<&str> {
        self.emotion(emotion)
            .and_then(|e| e.hormones.get(hormone))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_palette_toml() {
        let toml_str = r##"
[[emotion]]
key = "medo"
light = "#D8B4FE"
main = "#A78BFA"
dark = "#7C3AED"
glow = "rgba(167, 139, 250, 0.3)"
chart = "#A78BFA"
hormones = { "Adrenalina" = "#D946EF" }
"##;
        let palette: Palette = toml::from_str(toml_str).unwrap();
        assert_eq!(palette.emotion("medo").unwrap().main, "#A78BFA");
        assert_eq!(palette.hormone_color("medo", "Adrenalina"), Some("#D946EF"));
        assert_eq!(palette.hormone_color("medo", "Cortisol"), None);
        assert_eq!(palette.hormone_color("raiva", "Adrenalina"), None);
    }
}
