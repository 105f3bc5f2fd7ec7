use iced::widget::{button, column, text, Space};
use iced::{Element, Theme};

use murmur_core::shared::model_resolver;

use crate::app::Message;
use crate::theme::tertiary_color;

pub fn view(theme: &Theme) -> Element<'static, Message> {
    let tertiary = tertiary_color(theme);
    let version = env!("CARGO_PKG_VERSION");

    let cache_dir = model_resolver::model_cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unavailable".to_string());

    column![
        text("Murmur").size(22),
        Space::new().height(4),
        text(format!("Version {version}")).size(13),
        Space::new().height(12),
        text(
            "Speech-to-text on your own machine. Recordings and uploaded \
             files are transcribed locally by whisper.cpp; nothing ever \
             leaves this computer."
        )
        .size(13),
        Space::new().height(16),
        text(format!("Models are cached in {cache_dir}"))
            .size(12)
            .color(tertiary),
        Space::new().height(16),
        button(text("Browse whisper.cpp models").size(13))
            .on_press(Message::OpenModelsPage)
            .padding([8, 16]),
    ]
    .spacing(0)
    .into()
}
