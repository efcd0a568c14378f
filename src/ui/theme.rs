//! Colour roles for catalog output.
//!
//! Colour is used only when stdout is a terminal and `NO_COLOR` is unset or
//! empty. Piped reports and `--format json` runs stay free of escape codes.

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    /// Setup banner, report section titles, table names in load reports
    pub title: Style,
    pub success: Style,
    pub failure: Style,
    /// Dangling references and other warnings
    pub caution: Style,
    /// Seed phase marker
    pub phase: Style,
    /// Status labels and "No results found."
    pub label: Style,
}

impl Theme {
    pub fn detect() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty());
        Self::for_output(console::Term::stdout().is_term(), no_color)
    }

    pub fn for_output(is_term: bool, no_color: bool) -> Self {
        if is_term && !no_color {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            caution: Style::new().yellow().bold(),
            phase: Style::new().magenta(),
            label: Style::new().white().dimmed(),
        }
    }

    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            success: Style::new(),
            failure: Style::new(),
            caution: Style::new(),
            phase: Style::new(),
            label: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    fn render(style: &Style) -> String {
        "Catalog Summary".style(style.clone()).to_string()
    }

    #[test]
    fn test_colour_only_on_terminal_without_no_color() {
        assert!(render(&Theme::for_output(true, false).title).contains('\u{1b}'));
        assert_eq!(render(&Theme::for_output(false, false).title), "Catalog Summary");
        assert_eq!(render(&Theme::for_output(true, true).title), "Catalog Summary");
    }

    #[test]
    fn test_plain_theme_has_no_escapes() {
        let plain = Theme::plain();
        for style in [&plain.title, &plain.success, &plain.failure, &plain.caution, &plain.phase, &plain.label] {
            assert!(!render(style).contains('\u{1b}'));
        }
    }
}
