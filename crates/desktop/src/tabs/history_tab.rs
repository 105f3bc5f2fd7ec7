use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use murmur_core::history::history_store::HistoryEntry;
use murmur_core::transcription::domain::transcript::Transcription;

use crate::app::Message;
use crate::theme::tertiary_color;
use crate::widgets::result_card;

const PREVIEW_CHARS: usize = 90;

pub fn view<'a>(
    entries: &'a [HistoryEntry],
    viewing: Option<&'a Transcription>,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let badge = container(text(entries.len().to_string()).size(11))
        .padding([2, 8])
        .style(container::rounded_box);

    let mut header = row![
        text("History").size(16),
        Space::new().width(8),
        badge,
        Space::new().width(Length::Fill),
    ]
    .align_y(iced::Alignment::Center);

    if !entries.is_empty() {
        header = header.push(
            button(text("Clear").size(12))
                .on_press(Message::ClearHistory)
                .padding([5, 12])
                .style(button::danger),
        );
    }

    let mut col = column![header, Space::new().height(12)].spacing(0);

    if let Some(result) = viewing {
        col = col
            .push(result_card::view(result, theme))
            .push(Space::new().height(10))
            .push(
                button(text("Back to list").size(12))
                    .on_press(Message::CloseHistoryEntry)
                    .padding([5, 12])
                    .style(button::secondary),
            );
        return col.into();
    }

    if entries.is_empty() {
        return col
            .push(
                container(text("No transcriptions yet").size(13).color(tertiary))
                    .width(Length::Fill)
                    .center_x(Length::Fill)
                    .padding([32, 0]),
            )
            .into();
    }

    let mut list = column![].spacing(6);
    for (i, entry) in entries.iter().enumerate() {
        let date = entry
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let item = column![
            text(date).size(11).color(tertiary),
            text(preview(&entry.text)).size(13),
        ]
        .spacing(2);

        list = list.push(
            button(container(item).padding([10, 12]).width(Length::Fill))
                .on_press(Message::HistorySelected(i))
                .padding(0)
                .width(Length::Fill)
                .style(button::text),
        );
    }

    col.push(list).into()
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
        format!("{}\u{2026}", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("hello"), "hello");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(200);
        let p = preview(&long);
        assert!(p.chars().count() <= PREVIEW_CHARS + 1);
        assert!(p.ends_with('\u{2026}'));
    }
}
