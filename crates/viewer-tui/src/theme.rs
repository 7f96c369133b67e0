//! 配色方案：category → 颜色
//!
//! Colors are 0xRRGGBB.

use ratatui::style::{Color, Modifier, Style};
use viewer_core::Category;

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: u32,
    text: u32,
    line_number: u32,
    keyword: u32,
    string: u32,
    comment: u32,
    number: u32,
    operator: u32,
    annotation: u32,
    class: u32,
    method: u32,
    current_line: u32,
    selection: u32,
    gutter_background: u32,
}

/// 内置主题
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    Monokai,
    Github,
    Dracula,
    SolarizedLight,
    SolarizedDark,
    Nord,
    NightOwl,
    Material,
}

impl Theme {
    pub const ALL: [Theme; 10] = [
        Theme::Light,
        Theme::Dark,
        Theme::Monokai,
        Theme::Github,
        Theme::Dracula,
        Theme::SolarizedLight,
        Theme::SolarizedDark,
        Theme::Nord,
        Theme::NightOwl,
        Theme::Material,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Monokai => "monokai",
            Theme::Github => "github",
            Theme::Dracula => "dracula",
            Theme::SolarizedLight => "solarized-light",
            Theme::SolarizedDark => "solarized-dark",
            Theme::Nord => "nord",
            Theme::NightOwl => "night-owl",
            Theme::Material => "material",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(&name))
    }

    /// 下一个主题（循环）
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: 0xFFFFFF,
                text: 0x000000,
                line_number: 0xAAAAAA,
                keyword: 0x0000FF,
                string: 0x008000,
                comment: 0x808080,
                number: 0xFF0000,
                operator: 0x000000,
                annotation: 0x808000,
                class: 0x0000FF,
                method: 0x800080,
                current_line: 0xF5F5F5,
                selection: 0xADD6FF,
                gutter_background: 0xF5F5F5,
            },
            Theme::Dark => Palette {
                background: 0x1E1E1E,
                text: 0xD4D4D4,
                line_number: 0x858585,
                keyword: 0x569CD6,
                string: 0xCE9178,
                comment: 0x6A9955,
                number: 0xB5CEA8,
                operator: 0xD4D4D4,
                annotation: 0xDCDCAA,
                class: 0x4EC9B0,
                method: 0xDCDCAA,
                current_line: 0x282828,
                selection: 0x264F78,
                gutter_background: 0x252526,
            },
            Theme::Monokai => Palette {
                background: 0x272822,
                text: 0xF8F8F2,
                line_number: 0x90908A,
                keyword: 0xF92672,
                string: 0xE6DB74,
                comment: 0x75715E,
                number: 0xAE81FF,
                operator: 0xF8F8F2,
                annotation: 0xA6E22E,
                class: 0x66D9EF,
                method: 0xA6E22E,
                current_line: 0x3E3D32,
                selection: 0x49483E,
                gutter_background: 0x2D2E27,
            },
            Theme::Github => Palette {
                background: 0xFFFFFF,
                text: 0x24292E,
                line_number: 0xCAD1D8,
                keyword: 0xD73A49,
                string: 0x032F62,
                comment: 0x6A737D,
                number: 0x005CC5,
                operator: 0x24292E,
                annotation: 0x6F42C1,
                class: 0x6F42C1,
                method: 0x6F42C1,
                current_line: 0xFAFBFC,
                selection: 0xADD6FF,
                gutter_background: 0xFAFBFC,
            },
            Theme::Dracula => Palette {
                background: 0x282A36,
                text: 0xF8F8F2,
                line_number: 0x6272A4,
                keyword: 0xFF79C6,
                string: 0xF1FA8C,
                comment: 0x6272A4,
                number: 0xBD93F9,
                operator: 0xF8F8F2,
                annotation: 0x50FA7B,
                class: 0x8BE9FD,
                method: 0x50FA7B,
                current_line: 0x44475A,
                selection: 0x44475A,
                gutter_background: 0x282A36,
            },
            Theme::SolarizedLight => Palette {
                background: 0xFDF6E3,
                text: 0x657B83,
                line_number: 0x93A1A1,
                keyword: 0x859900,
                string: 0x2AA198,
                comment: 0x93A1A1,
                number: 0xD33682,
                operator: 0x657B83,
                annotation: 0xCB4B16,
                class: 0x268BD2,
                method: 0x268BD2,
                current_line: 0xEEE8D5,
                selection: 0xEEE8D5,
                gutter_background: 0xEEE8D5,
            },
            Theme::SolarizedDark => Palette {
                background: 0x002B36,
                text: 0x839496,
                line_number: 0x586E75,
                keyword: 0x859900,
                string: 0x2AA198,
                comment: 0x586E75,
                number: 0xD33682,
                operator: 0x839496,
                annotation: 0xCB4B16,
                class: 0x268BD2,
                method: 0x268BD2,
                current_line: 0x073642,
                selection: 0x073642,
                gutter_background: 0x073642,
            },
            Theme::Nord => Palette {
                background: 0x2E3440,
                text: 0xD8DEE9,
                line_number: 0x4C566A,
                keyword: 0x81A1C1,
                string: 0xA3BE8C,
                comment: 0x616E88,
                number: 0xB48EAD,
                operator: 0x81A1C1,
                annotation: 0x8FBCBB,
                class: 0x8FBCBB,
                method: 0x88C0D0,
                current_line: 0x3B4252,
                selection: 0x434C5E,
                gutter_background: 0x3B4252,
            },
            Theme::NightOwl => Palette {
                background: 0x011627,
                text: 0xD6DEEB,
                line_number: 0x4B6479,
                keyword: 0xC792EA,
                string: 0xECC48D,
                comment: 0x637777,
                number: 0xF78C6C,
                operator: 0x7FDBCA,
                annotation: 0xFFCB8B,
                class: 0xFFCB8B,
                method: 0x82AAFF,
                current_line: 0x0E293F,
                selection: 0x1D3B53,
                gutter_background: 0x011627,
            },
            Theme::Material => Palette {
                background: 0x263238,
                text: 0xEEFFFF,
                line_number: 0x546E7A,
                keyword: 0xC792EA,
                string: 0xC3E88D,
                comment: 0x546E7A,
                number: 0xF78C6C,
                operator: 0x89DDFF,
                annotation: 0xFFCB6B,
                class: 0xFFCB6B,
                method: 0x82AAFF,
                current_line: 0x2C3B41,
                selection: 0x314549,
                gutter_background: 0x263238,
            },
        }
    }

    /// 普通文本
    pub fn text(self) -> Style {
        let p = self.palette();
        Style::default().fg(rgb(p.text)).bg(rgb(p.background))
    }

    /// 某个 category 的样式（背景沿用普通文本）
    pub fn category(self, category: Category) -> Style {
        let p = self.palette();
        let fg = match category {
            Category::Keyword => p.keyword,
            Category::String => p.string,
            Category::Comment => p.comment,
            Category::Number => p.number,
            Category::Annotation => p.annotation,
            Category::Class => p.class,
            Category::Method => p.method,
            Category::Operator => p.operator,
        };
        let style = self.text().fg(rgb(fg));
        match category {
            Category::Comment => style.add_modifier(Modifier::ITALIC),
            Category::Keyword => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    pub fn gutter(self) -> Style {
        let p = self.palette();
        Style::default()
            .fg(rgb(p.line_number))
            .bg(rgb(p.gutter_background))
    }

    pub fn current_line_bg(self) -> Color {
        rgb(self.palette().current_line)
    }

    pub fn search_bg(self) -> Color {
        rgb(self.palette().selection)
    }
}

fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(Theme::from_name("Night_Owl"), Some(Theme::NightOwl));
        assert_eq!(Theme::from_name("neon"), None);
    }

    #[test]
    fn test_next_cycles() {
        assert_eq!(Theme::Material.next(), Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::Dark);
    }

    #[test]
    fn test_rgb_split() {
        assert_eq!(rgb(0x1E2A3B), Color::Rgb(0x1E, 0x2A, 0x3B));
    }
}
