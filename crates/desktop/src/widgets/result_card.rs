use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use murmur_core::transcription::domain::transcript::Transcription;

use crate::app::{ExportFormat, Message};
use crate::theme::tertiary_color;

/// A completed transcription with its copy/export actions and per-chunk
/// timestamps.
pub fn view<'a>(result: &'a Transcription, theme: &Theme) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let segments = result.chunks.len();
    let meta = text(format!(
        "{segments} segment{}",
        if segments == 1 { "" } else { "s" }
    ))
    .size(12)
    .color(tertiary);

    let actions = row![
        action_button("Copy", Message::CopyResult),
        action_button("TXT", Message::Export(ExportFormat::Txt)),
        action_button("SRT", Message::Export(ExportFormat::Srt)),
    ]
    .spacing(6);

    let bar = row![meta, Space::new().width(Length::Fill), actions]
        .align_y(iced::Alignment::Center);

    let mut card = column![bar, Space::new().height(10), text(result.text.clone()).size(14)]
        .spacing(0);

    if !result.chunks.is_empty() {
        let mut rows = column![].spacing(4);
        for chunk in &result.chunks {
            rows = rows.push(
                row![
                    text(format!("{} \u{2013} {}", clock(chunk.start), clock(chunk.end)))
                        .size(12)
                        .color(tertiary)
                        .width(110),
                    text(chunk.text.trim().to_string()).size(12),
                ]
                .spacing(8),
            );
        }
        card = card
            .push(Space::new().height(12))
            .push(text("Timestamps").size(12).color(tertiary))
            .push(Space::new().height(6))
            .push(rows);
    }

    container(card)
        .padding(16)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn action_button(label: &str, message: Message) -> Element<'_, Message> {
    button(text(label).size(12))
        .on_press(message)
        .padding([5, 12])
        .style(button::secondary)
        .into()
}

/// Short clock form for on-screen timestamps, e.g. `1:01.5`.
fn clock(seconds: f64) -> String {
    let minutes = (seconds.max(0.0) / 60.0).floor() as u64;
    let secs = seconds.max(0.0) - minutes as f64 * 60.0;
    format!("{minutes}:{secs:04.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_pads_seconds() {
        assert_eq!(clock(61.5), "1:01.5");
        assert_eq!(clock(0.0), "0:00.0");
        assert_eq!(clock(125.25), "2:05.2");
    }
}
