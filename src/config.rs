use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToyConfig {
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub slider: SliderConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub step_forward: String,
    pub step_back: String,
    pub jump_forward: String,
    pub jump_back: String,
    pub first: String,
    pub last: String,
    pub toggle_reverse: String,
    pub toggle_result: String,
    pub toggle_original_csys: String,
    pub toggle_final_csys: String,
    pub run: String,
    pub quit: String,
    pub toggle_builder: String,
    pub builder_kind: String,
    pub builder_add: String,
    pub builder_delete: String,
    pub builder_reset: String,
}

/// Progress slider behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    /// Fine step, also the autoplay increment per frame.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Step for the jump bindings: one whole command.
    #[serde(default = "default_jump")]
    pub jump: f64,
    #[serde(default = "default_frame_millis")]
    pub frame_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_panel_width")]
    pub panel_width: u16,
    #[serde(default = "default_panel_height")]
    pub panel_height: u16,
    /// World units from the 3D view center to its top edge.
    #[serde(default = "default_scene_extent")]
    pub scene_extent: f64,
}

fn default_step() -> f64 { 0.02 }
fn default_jump() -> f64 { 1.0 }
fn default_frame_millis() -> u64 { 16 }
fn default_panel_width() -> u16 { 48 }
fn default_panel_height() -> u16 { 22 }
fn default_scene_extent() -> f64 { 6.0 }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            step_forward: "Right".into(),
            step_back: "Left".into(),
            jump_forward: "Up".into(),
            jump_back: "Down".into(),
            first: "Home".into(),
            last: "End".into(),
            toggle_reverse: "r".into(),
            toggle_result: "f".into(),
            toggle_original_csys: "o".into(),
            toggle_final_csys: "c".into(),
            run: "Space".into(),
            quit: "q".into(),
            toggle_builder: "b".into(),
            builder_kind: "k".into(),
            builder_add: "a".into(),
            builder_delete: "d".into(),
            builder_reset: "x".into(),
        }
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        SliderConfig {
            step: default_step(),
            jump: default_jump(),
            frame_millis: default_frame_millis(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            panel_width: default_panel_width(),
            panel_height: default_panel_height(),
            scene_extent: default_scene_extent(),
        }
    }
}

impl Default for ToyConfig {
    fn default() -> Self {
        ToyConfig {
            key_bindings: KeyBindings::default(),
            slider: SliderConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl ToyConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("invalid toy config ({e}), using defaults");
                Self::default()
            }
        }
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("transform-toy");
        path.push("config.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(ch) = binding.strip_prefix("Ctrl-") {
        return event.modifiers.contains(KeyModifiers::CONTROL)
            && ch.chars().next().is_some_and(|c| event.code == KeyCode::Char(c));
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Home" => event.code == KeyCode::Home,
        "End" => event.code == KeyCode::End,
        s => {
            if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<u8>().ok()) {
                return event.code == KeyCode::F(n);
            }
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => event.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = ToyConfig::from_json(r#"{ "slider": { "step": 0.1 } }"#);
        assert_eq!(config.slider.step, 0.1);
        assert_eq!(config.slider.jump, 1.0);
        assert_eq!(config.key_bindings, KeyBindings::default());

        let config = ToyConfig::from_json(r#"{ "key_bindings": { "builder_add": "Enter" } }"#);
        assert_eq!(config.key_bindings.builder_add, "Enter");
        assert_eq!(config.key_bindings.toggle_builder, "b");
        assert_eq!(config.viewport, ViewportConfig::default());
    }

    #[test]
    fn invalid_config_falls_back() {
        assert_eq!(ToyConfig::from_json("{ nope"), ToyConfig::default());
    }

    #[test]
    fn bindings_match_keys() {
        let none = KeyModifiers::NONE;
        assert!(matches_binding("Right", &key(KeyCode::Right, none)));
        assert!(matches_binding("Space", &key(KeyCode::Char(' '), none)));
        assert!(matches_binding("r", &key(KeyCode::Char('r'), none)));
        assert!(!matches_binding("r", &key(KeyCode::Char('r'), KeyModifiers::ALT)));
        assert!(matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(matches_binding("F5", &key(KeyCode::F(5), none)));
        assert!(!matches_binding("Fx", &key(KeyCode::Char('F'), none)));
    }
}
