use iced::border::Border;
use iced::widget::{button, column, container, text, Space};
use iced::{Color, Element, Length, Theme};

use crate::app::Message;
use crate::theme::tertiary_color;
use crate::widgets::waveform;

pub fn view<'a>(
    recording: bool,
    seconds: u64,
    samples: &'a [f32],
    error: Option<&'a str>,
    has_take: bool,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    // Round dot while idle, square while recording (stop affordance)
    let glyph_radius = if recording { 3.0 } else { 100.0 };
    let glyph = container(Space::new().width(18).height(18)).style(move |_theme: &Theme| {
        container::Style {
            background: Some(iced::Background::Color(Color::WHITE)),
            border: Border {
                radius: glyph_radius.into(),
                ..Border::default()
            },
            ..container::Style::default()
        }
    });

    let record_btn = button(
        container(glyph)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    )
    .width(64)
    .height(64)
    .on_press(Message::ToggleRecord)
    .style(move |theme: &Theme, _status| {
        let palette = theme.extended_palette();
        let base = if recording {
            palette.danger.base.color
        } else {
            palette.primary.base.color
        };
        button::Style {
            background: Some(iced::Background::Color(base)),
            border: Border {
                radius: 100.0.into(),
                ..Border::default()
            },
            ..button::Style::default()
        }
    });

    let timer = text(format!("{}:{:02}", seconds / 60, seconds % 60)).size(20);

    let hint = if recording {
        "Click to stop"
    } else if has_take {
        "Recording ready"
    } else {
        "Click to record"
    };

    let mut col = column![
        record_btn,
        Space::new().height(10),
        timer,
        Space::new().height(4),
        text(hint).size(13).color(tertiary),
        Space::new().height(16),
        waveform::view(samples),
    ]
    .align_x(iced::Alignment::Center)
    .width(Length::Fill);

    if let Some(error) = error {
        let danger = theme.extended_palette().danger.base.color;
        col = col
            .push(Space::new().height(10))
            .push(text(error.to_owned()).size(13).color(danger));
    }

    container(col).padding([20, 0]).width(Length::Fill).into()
}
