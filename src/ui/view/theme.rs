//! 深色 / 浅色配色

use ratatui::style::Color;

use crate::models::Priority;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub selection: Color,
    pub done: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self {
                fg: Color::Gray,
                bg: Color::Black,
                muted: Color::DarkGray,
                accent: Color::LightBlue,
                selection: Color::Yellow,
                done: Color::Green,
                high: Color::LightRed,
                medium: Color::LightYellow,
                low: Color::LightGreen,
                warning: Color::LightRed,
            }
        } else {
            Self {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::Gray,
                accent: Color::Blue,
                selection: Color::Magenta,
                done: Color::Green,
                high: Color::Red,
                medium: Color::Yellow,
                low: Color::Green,
                warning: Color::Red,
            }
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}
