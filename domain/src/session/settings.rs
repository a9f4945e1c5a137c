//! Session settings and card decks

use serde::{Deserialize, Serialize};

/// Built-in card decks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckPreset {
    #[default]
    Fibonacci,
    PowersOfTwo,
}

impl DeckPreset {
    pub fn cards(&self) -> &'static [&'static str] {
        match self {
            DeckPreset::Fibonacci => &["0", "1", "2", "3", "5", "8", "13", "21", "?", "coffee"],
            DeckPreset::PowersOfTwo => &["0", "1", "2", "4", "8", "16", "32", "64", "?", "coffee"],
        }
    }

    pub fn to_labels(&self) -> Vec<String> {
        self.cards().iter().map(|c| c.to_string()).collect()
    }
}

impl std::str::FromStr for DeckPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fibonacci" => Ok(DeckPreset::Fibonacci),
            "powers_of_two" | "pow2" => Ok(DeckPreset::PowersOfTwo),
            other => Err(format!(
                "Unknown deck: {}. Valid: fibonacci, powers_of_two",
                other
            )),
        }
    }
}

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Card labels offered to voters, in display order; each parses as a
    /// [`VoteValue`](crate::vote::VoteValue)
    pub card_deck: Vec<String>,
    /// Reveal automatically once every connected voter has voted
    pub auto_reveal: bool,
}

impl SessionSettings {
    pub fn with_deck(preset: DeckPreset) -> Self {
        Self {
            card_deck: preset.to_labels(),
            auto_reveal: false,
        }
    }

    pub fn with_auto_reveal(mut self, auto_reveal: bool) -> Self {
        self.auto_reveal = auto_reveal;
        self
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::with_deck(DeckPreset::default())
    }
}

/// Partial update of [`SessionSettings`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_deck: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_reveal: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deck_is_fibonacci() {
        let settings = SessionSettings::default();
        assert_eq!(settings.card_deck.first().map(String::as_str), Some("0"));
        assert_eq!(settings.card_deck.last().map(String::as_str), Some("coffee"));
        assert!(!settings.auto_reveal);
    }

    #[test]
    fn test_deck_from_str() {
        assert_eq!("fibonacci".parse::<DeckPreset>().unwrap(), DeckPreset::Fibonacci);
        assert_eq!(
            "POWERS_OF_TWO".parse::<DeckPreset>().unwrap(),
            DeckPreset::PowersOfTwo
        );
        assert_eq!("pow2".parse::<DeckPreset>().unwrap(), DeckPreset::PowersOfTwo);
        assert!("t_shirt".parse::<DeckPreset>().is_err());
    }
}
