use ratatui::style::Color;

pub(crate) const PURE_WHITE: Color = Color::Rgb(255, 255, 255);
pub(crate) const ACCENT: Color = Color::Rgb(124, 58, 237);
pub(crate) const MUTED: Color = Color::Rgb(107, 114, 128);
