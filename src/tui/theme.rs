use crate::config::ThemeConfig;
use log::warn;
use ratatui::style::Color;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub hint: Color,
    pub success: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            text: Color::White,
            hint: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = Self::default();
        Self {
            accent: parse_color("accent", config.accent.as_deref(), defaults.accent),
            text: parse_color("text", config.text.as_deref(), defaults.text),
            hint: parse_color("hint", config.hint.as_deref(), defaults.hint),
            success: parse_color("success", config.success.as_deref(), defaults.success),
            error: parse_color("error", config.error.as_deref(), defaults.error),
        }
    }
}

fn parse_color(name: &str, value: Option<&str>, fallback: Color) -> Color {
    let Some(value) = value else {
        return fallback;
    };
    match Color::from_str(value.trim()) {
        Ok(color) => color,
        Err(_) => {
            warn!("Ignoring invalid theme colour {} = {:?}", name, value);
            fallback
        }
    }
}
