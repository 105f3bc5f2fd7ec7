pub mod primary_button;
pub mod result_card;
pub mod waveform;
