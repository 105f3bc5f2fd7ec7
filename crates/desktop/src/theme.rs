use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

/// Resolve the iced Theme from the system appearance.
pub fn resolve_theme() -> Theme {
    let palette = if detect_system_dark_mode() {
        dark_palette()
    } else {
        light_palette()
    };
    Theme::custom("Murmur", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x5e, 0x9f, 0xf5),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf5, 0xf5, 0xf7),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x34, 0x78, 0xf6),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

/// Secondary text color for hints and metadata.
pub fn tertiary_color(theme: &Theme) -> Color {
    let palette = theme.extended_palette();
    Color {
        a: 0.55,
        ..palette.background.base.text
    }
}

/// Slightly raised background for cards and wells.
pub fn surface_color(theme: &Theme) -> Color {
    theme.extended_palette().background.weak.color
}
