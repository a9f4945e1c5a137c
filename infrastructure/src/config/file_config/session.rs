//! Session defaults from TOML (`[session]` section)

use poker_application::SessionDefaults;
use poker_domain::{CONSENSUS_THRESHOLD_PERCENT, DeckPreset, SessionSettings};
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Built-in deck for new sessions
    pub deck: DeckPreset,
    /// Explicit card labels; overrides `deck` when set
    pub cards: Option<Vec<String>>,
    /// Reveal automatically once every connected voter has voted
    pub auto_reveal: bool,
    /// Percentage one value must exceed for consensus
    pub consensus_threshold: f64,
    /// New sessions are named "{name_prefix} {session_id}"
    pub name_prefix: String,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            deck: DeckPreset::default(),
            cards: None,
            auto_reveal: false,
            consensus_threshold: CONSENSUS_THRESHOLD_PERCENT,
            name_prefix: "Session".to_string(),
        }
    }
}

impl FileSessionConfig {
    pub fn to_settings(&self) -> SessionSettings {
        let settings = match &self.cards {
            Some(cards) => SessionSettings {
                card_deck: cards.clone(),
                auto_reveal: false,
            },
            None => SessionSettings::with_deck(self.deck),
        };
        settings.with_auto_reveal(self.auto_reveal)
    }

    pub fn to_defaults(&self) -> SessionDefaults {
        SessionDefaults::default()
            .with_name_prefix(self.name_prefix.clone())
            .with_settings(self.to_settings())
            .with_consensus_threshold(self.consensus_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_override_deck() {
        let toml_str = r#"
[session]
deck = "powers_of_two"
cards = ["1", "2", "3", "?"]
auto_reveal = true
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let settings = config.session.to_settings();
        assert_eq!(settings.card_deck, vec!["1", "2", "3", "?"]);
        assert!(settings.auto_reveal);
    }

    #[test]
    fn test_to_defaults() {
        let config = FileSessionConfig {
            name_prefix: "Sprint".to_string(),
            consensus_threshold: 50.0,
            ..Default::default()
        };
        let defaults = config.to_defaults();
        assert_eq!(defaults.name_prefix, "Sprint");
        assert_eq!(defaults.consensus_threshold, 50.0);
        assert_eq!(defaults.settings, SessionSettings::default());
    }
}
