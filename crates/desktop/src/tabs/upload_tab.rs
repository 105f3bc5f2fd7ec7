use std::path::Path;

use iced::border::Border;
use iced::widget::{button, column, container, mouse_area, row, text, Space};
use iced::{Color, Element, Length, Theme};

use crate::app::Message;
use crate::theme::{surface_color, tertiary_color};

pub fn view<'a>(
    selected: Option<&'a Path>,
    drag_over: bool,
    decoding: bool,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);
    let palette = theme.extended_palette();
    let accent = palette.primary.base.color;

    let icon_circle = container(
        container(text("\u{2B06}").size(22).color(accent))
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    )
    .width(56)
    .height(56)
    .style(move |_theme: &Theme| container::Style {
        background: Some(iced::Background::Color(Color { a: 0.12, ..accent })),
        border: Border {
            radius: 100.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    });

    let browse_btn = button(text("Browse Files").size(14))
        .on_press(Message::BrowseFile)
        .padding([10, 24]);

    let inner = column![
        icon_circle,
        Space::new().height(16),
        text("Drop a file here to get started")
            .size(17)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..iced::Font::DEFAULT
            }),
        Space::new().height(6),
        text("or click to browse your computer").size(14).color(tertiary),
        Space::new().height(20),
        browse_btn,
        Space::new().height(16),
        text("WAV, MP3, M4A, FLAC, OGG, OPUS, WEBM, MP4").size(12).color(tertiary),
    ]
    .align_x(iced::Alignment::Center);

    let border_color = if drag_over {
        Color { a: 0.50, ..accent }
    } else {
        Color {
            a: 0.20,
            ..palette.background.base.text
        }
    };
    let background = if drag_over {
        Color { a: 0.06, ..accent }
    } else {
        surface_color(theme)
    };

    let drop_zone = container(inner)
        .padding([40, 40])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(background)),
            border: Border {
                color: border_color,
                width: 2.0,
                radius: 16.0.into(),
            },
            ..container::Style::default()
        });

    let mut col = column![mouse_area(drop_zone).on_press(Message::BrowseFile)].spacing(0);

    if let Some(path) = selected {
        col = col.push(Space::new().height(12)).push(file_tag(path, theme));
    }

    if decoding {
        col = col
            .push(Space::new().height(12))
            .push(text("Decoding audio\u{2026}").size(13).color(tertiary));
    }

    col.width(Length::Fill).into()
}

fn file_tag<'a>(path: &'a Path, theme: &Theme) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let size = std::fs::metadata(path)
        .map(|m| format!(" ({:.1} MB)", m.len() as f64 / 1_048_576.0))
        .unwrap_or_default();

    container(
        row![
            text(name).size(13),
            text(size).size(13).color(tertiary),
        ]
        .spacing(2),
    )
    .padding([8, 12])
    .style(container::rounded_box)
    .into()
}
