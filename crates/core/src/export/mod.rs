mod srt;
mod text;

pub use srt::srt;
pub use text::plain_text;
