/// Sample rate whisper.cpp expects: everything handed to the transcriber is
/// mono PCM at this rate.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Most-recent entries kept in the transcription history.
pub const HISTORY_LIMIT: usize = 50;

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "mp3", "m4a", "flac", "ogg", "opus", "webm", "mp4", "aac",
];
