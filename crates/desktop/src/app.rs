use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{button, column, container, pick_list, progress_bar, row, scrollable, text, Space};
use iced::{Element, Length, Subscription, Task, Theme};

use murmur_core::audio::domain::decoder::AudioDecoder;
use murmur_core::audio::domain::sample_buffer::SampleBuffer;
use murmur_core::audio::infrastructure::cpal_recorder::CpalRecorder;
use murmur_core::audio::infrastructure::ffmpeg_decoder::FfmpegDecoder;
use murmur_core::export;
use murmur_core::history::history_store::HistoryStore;
use murmur_core::shared::constants::{AUDIO_EXTENSIONS, WHISPER_SAMPLE_RATE};
use murmur_core::shared::model_catalog::{self, ModelSpec};
use murmur_core::transcription::domain::device::Device;
use murmur_core::transcription::domain::transcript::Transcription;

use crate::settings::Settings;
use crate::tabs;
use crate::theme;
use crate::widgets::{primary_button, result_card};
use crate::workers::inference_worker::{
    InferenceWorker, ModelState, TranscribeState, WorkerEvent,
};

const MODELS_PAGE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp";

/// Most recent device-rate samples snapshotted for the live waveform.
const WAVEFORM_SAMPLES: usize = 2048;

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Record,
    Upload,
    History,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Record, Tab::Upload, Tab::History, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Record => "Record",
            Tab::Upload => "Upload File",
            Tab::History => "History",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Audio source
// ---------------------------------------------------------------------------

/// The audio waiting to be transcribed. Exactly one source is retained at
/// a time; selecting one kind clears the other.
enum AudioSource {
    /// A finished microphone take, already mono 16 kHz.
    Recording(SampleBuffer),
    /// A user-selected file, decoded when transcription is requested.
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Srt,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    ModelSelected(ModelSpec),
    DeviceSelected(Device),
    LoadModel,
    PollWorker,
    ToggleRecord,
    RecordTick,
    BrowseFile,
    FileSelected(Option<PathBuf>),
    FileDropped(PathBuf),
    DragOver(bool),
    Transcribe,
    TranscribeHover(bool),
    AudioDecoded(Result<SampleBuffer, String>),
    CopyResult,
    Export(ExportFormat),
    ExportPathChosen(ExportFormat, Option<PathBuf>),
    HistorySelected(usize),
    CloseHistoryEntry,
    ClearHistory,
    OpenModelsPage,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    settings: Settings,
    worker: InferenceWorker,
    selected_model: ModelSpec,
    selected_device: Device,
    audio_source: Option<AudioSource>,
    recorder: Option<CpalRecorder>,
    record_seconds: u64,
    waveform: Vec<f32>,
    record_error: Option<String>,
    drag_over: bool,
    decoding: bool,
    transcribe_hovered: bool,
    result: Option<Transcription>,
    viewing: Option<Transcription>,
    history: HistoryStore,
    error: Option<String>,
    status: Option<String>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let mut worker = InferenceWorker::spawn();

        let saved_model = settings
            .last_model
            .as_deref()
            .and_then(model_catalog::find)
            .copied();
        let selected_model = saved_model.unwrap_or(*model_catalog::default_model());
        let selected_device = settings.device;

        // A previously loaded model comes back automatically
        if let Some(model) = saved_model {
            worker.request_load(model, selected_device);
        }

        (
            Self {
                active_tab: Tab::Record,
                settings,
                worker,
                selected_model,
                selected_device,
                audio_source: None,
                recorder: None,
                record_seconds: 0,
                waveform: Vec::new(),
                record_error: None,
                drag_over: false,
                decoding: false,
                transcribe_hovered: false,
                result: None,
                viewing: None,
                history: HistoryStore::open_default(),
                error: None,
                status: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::ModelSelected(model) => {
                self.selected_model = model;
            }
            Message::DeviceSelected(device) => {
                self.selected_device = device;
            }
            Message::LoadModel => {
                self.error = None;
                self.status = None;
                self.worker
                    .request_load(self.selected_model, self.selected_device);
            }
            Message::PollWorker => {
                for event in self.worker.poll() {
                    match event {
                        WorkerEvent::Ready => {
                            self.settings.last_model =
                                self.worker.state.loaded_model.map(|m| m.id.to_string());
                            self.settings.device = self.selected_device;
                            self.settings.save();
                        }
                        WorkerEvent::Complete(result) => {
                            self.history.record(&result);
                            self.result = Some(result);
                            self.viewing = None;
                        }
                        _ => {}
                    }
                }
            }
            Message::ToggleRecord => {
                if let Some(recorder) = self.recorder.take() {
                    match recorder.finish() {
                        Ok(take) => self.set_recording_source(take),
                        Err(e) => self.record_error = Some(e.to_string()),
                    }
                    self.waveform.clear();
                } else {
                    match CpalRecorder::start() {
                        Ok(recorder) => {
                            self.recorder = Some(recorder);
                            self.record_seconds = 0;
                            self.record_error = None;
                        }
                        Err(e) => self.record_error = Some(e.to_string()),
                    }
                }
            }
            Message::RecordTick => {
                if let Some(recorder) = &self.recorder {
                    self.record_seconds = recorder.elapsed().as_secs();
                    self.waveform = recorder.waveform_tail(WAVEFORM_SAMPLES);
                }
            }
            Message::BrowseFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select audio file")
                            .add_filter("Audio Files", AUDIO_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::FileSelected,
                );
            }
            Message::FileSelected(Some(path)) => {
                self.set_file_source(path);
            }
            Message::FileSelected(None) => {}
            Message::FileDropped(path) => {
                self.drag_over = false;
                if has_audio_extension(&path) {
                    self.set_file_source(path);
                    self.active_tab = Tab::Upload;
                } else {
                    self.error = Some(format!(
                        "unsupported file type: {}",
                        path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.display().to_string())
                    ));
                }
            }
            Message::DragOver(over) => {
                self.drag_over = over;
            }
            Message::Transcribe => {
                if !self.can_transcribe() {
                    return Task::none();
                }
                self.error = None;
                self.status = None;
                // Ownership of the audio moves to the worker; the source
                // slot empties until new audio is supplied.
                match self.audio_source.take() {
                    Some(AudioSource::Recording(take)) => {
                        self.worker.request_transcribe(take);
                    }
                    Some(AudioSource::File(path)) => {
                        self.decoding = true;
                        return Task::perform(
                            async move {
                                FfmpegDecoder
                                    .decode(&path, WHISPER_SAMPLE_RATE)
                                    .map_err(|e| e.to_string())
                            },
                            Message::AudioDecoded,
                        );
                    }
                    None => {}
                }
            }
            Message::TranscribeHover(hovered) => {
                self.transcribe_hovered = hovered;
            }
            Message::AudioDecoded(Ok(audio)) => {
                self.decoding = false;
                self.worker.request_transcribe(audio);
            }
            Message::AudioDecoded(Err(e)) => {
                self.decoding = false;
                self.error = Some(e);
            }
            Message::CopyResult => {
                if let Some(result) = self.active_result() {
                    return iced::clipboard::write(export::plain_text(result));
                }
            }
            Message::Export(format) => {
                if self.active_result().is_some() {
                    return Task::perform(save_dialog(format), move |path| {
                        Message::ExportPathChosen(format, path)
                    });
                }
            }
            Message::ExportPathChosen(format, Some(path)) => {
                if let Some(result) = self.active_result() {
                    let content = match format {
                        ExportFormat::Txt => export::plain_text(result),
                        ExportFormat::Srt => export::srt(result),
                    };
                    match std::fs::write(&path, content) {
                        Ok(()) => self.status = Some(format!("Saved {}", path.display())),
                        Err(e) => self.error = Some(format!("failed to save: {e}")),
                    }
                }
            }
            Message::ExportPathChosen(_, None) => {}
            Message::HistorySelected(index) => {
                self.viewing = self.history.entries().get(index).map(|e| e.transcription());
            }
            Message::CloseHistoryEntry => {
                self.viewing = None;
            }
            Message::ClearHistory => {
                self.history.clear();
                self.viewing = None;
            }
            Message::OpenModelsPage => {
                let _ = open::that(MODELS_PAGE_URL);
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let theme = self.theme();
        let tertiary = theme::tertiary_color(&theme);

        let header = column![
            text("Murmur").size(22),
            text("Speech-to-text on your own machine").size(13).color(tertiary),
        ]
        .spacing(2);

        // Tab bar
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(13);
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let mut page = column![
            header,
            Space::new().height(14),
            self.model_bar(),
        ]
        .spacing(0);

        if !self.worker.state.progress.is_empty() {
            page = page
                .push(Space::new().height(10))
                .push(self.progress_section(&theme));
        }

        if let Some(status) = self.status_line(&theme) {
            page = page.push(Space::new().height(10)).push(status);
        }

        page = page.push(Space::new().height(14)).push(tab_bar);
        page = page.push(Space::new().height(10));

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Record => tabs::record_tab::view(
                self.recorder.is_some(),
                self.record_seconds,
                &self.waveform,
                self.record_error.as_deref(),
                matches!(self.audio_source, Some(AudioSource::Recording(_))),
                &theme,
            ),
            Tab::Upload => tabs::upload_tab::view(
                match &self.audio_source {
                    Some(AudioSource::File(path)) => Some(path.as_path()),
                    _ => None,
                },
                self.drag_over,
                self.decoding,
                &theme,
            ),
            Tab::History => {
                tabs::history_tab::view(self.history.entries(), self.viewing.as_ref(), &theme)
            }
            Tab::About => tabs::about_tab::view(&theme),
        };
        page = page.push(content);

        // The transcribe action and the latest result live under both
        // input tabs
        if matches!(self.active_tab, Tab::Record | Tab::Upload) {
            page = page
                .push(Space::new().height(14))
                .push(self.transcribe_area(&theme));

            if let Some(result) = &self.result {
                page = page
                    .push(Space::new().height(14))
                    .push(result_card::view(result, &theme));
            }
        }

        let footer = container(
            text(format!("Murmur {}", env!("CARGO_PKG_VERSION")))
                .size(11)
                .color(tertiary),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding([4, 0]);

        column![
            container(scrollable(page).height(Length::Fill)).padding(16).height(Length::Fill),
            footer
        ]
        .height(Length::Fill)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![iced::event::listen_with(|event, _status, _window| {
            match event {
                iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                    Some(Message::FileDropped(path))
                }
                iced::Event::Window(iced::window::Event::FileHovered(_)) => {
                    Some(Message::DragOver(true))
                }
                iced::Event::Window(iced::window::Event::FilesHoveredLeft) => {
                    Some(Message::DragOver(false))
                }
                _ => None,
            }
        })];

        if self.recorder.is_some() {
            subscriptions.push(
                iced::time::every(Duration::from_millis(50)).map(|_| Message::RecordTick),
            );
        }

        if self.worker.is_active() {
            subscriptions.push(
                iced::time::every(Duration::from_millis(100)).map(|_| Message::PollWorker),
            );
        }

        Subscription::batch(subscriptions)
    }

    // -- helpers ------------------------------------------------------------

    /// A transcription may start only with a ready model, no transcription
    /// in flight, an audio source selected, and no decode pending.
    fn can_transcribe(&self) -> bool {
        self.worker.state.can_transcribe() && self.audio_source.is_some() && !self.decoding
    }

    fn set_file_source(&mut self, path: PathBuf) {
        // Selecting a file clears any recorded take (and an in-progress
        // recording)
        self.recorder = None;
        self.waveform.clear();
        self.audio_source = Some(AudioSource::File(path));
        self.error = None;
    }

    fn set_recording_source(&mut self, take: SampleBuffer) {
        // A finished take clears any selected file
        self.audio_source = Some(AudioSource::Recording(take));
        self.record_error = None;
        self.error = None;
    }

    fn active_result(&self) -> Option<&Transcription> {
        if self.active_tab == Tab::History {
            self.viewing.as_ref()
        } else {
            self.result.as_ref()
        }
    }

    fn model_bar(&self) -> Element<'_, Message> {
        let state = &self.worker.state;
        let loading = state.model == ModelState::Loading;
        let busy = state.transcribe == TranscribeState::Busy;
        let model_ready = state.model == ModelState::Ready;
        let selected_is_loaded =
            state.loaded_model.map(|m| m.id) == Some(self.selected_model.id);

        let model_input: Element<'_, Message> = if loading || busy {
            text(self.selected_model.label).size(14).into()
        } else {
            pick_list(
                model_catalog::MODELS,
                Some(self.selected_model),
                Message::ModelSelected,
            )
            .text_size(14)
            .into()
        };

        let device_input: Element<'_, Message> = if loading || busy {
            text(self.selected_device.to_string()).size(14).into()
        } else {
            pick_list(
                Device::ALL,
                Some(self.selected_device),
                Message::DeviceSelected,
            )
            .text_size(14)
            .into()
        };

        let label = if loading {
            "Loading\u{2026}"
        } else if model_ready && selected_is_loaded {
            "Loaded"
        } else if model_ready {
            "Switch Model"
        } else {
            "Load Model"
        };

        let can_load = state.can_load() && (!model_ready || !selected_is_loaded);
        let mut load_btn = button(text(label).size(13)).padding([8, 16]);
        if can_load {
            load_btn = load_btn.on_press(Message::LoadModel);
        }

        container(
            row![
                text("Model").size(13),
                model_input,
                device_input,
                Space::new().width(Length::Fill),
                load_btn,
            ]
            .spacing(10)
            .align_y(iced::Alignment::Center),
        )
        .padding([12, 14])
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
    }

    fn progress_section(&self, theme: &Theme) -> Element<'_, Message> {
        let tertiary = theme::tertiary_color(theme);

        let mut entries: Vec<(&String, &f32)> = self.worker.state.progress.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut col = column![].spacing(6);
        for (file, percent) in entries {
            col = col.push(
                row![
                    text(file.clone()).size(12).color(tertiary).width(160),
                    progress_bar(0.0..=100.0, *percent).girth(8),
                    text(format!("{:>3.0}%", percent)).size(12).color(tertiary),
                ]
                .spacing(10)
                .align_y(iced::Alignment::Center),
            );
        }
        col.into()
    }

    fn status_line(&self, theme: &Theme) -> Option<Element<'_, Message>> {
        let palette = theme.extended_palette();

        if let Some(error) = self.worker.state.last_error.as_ref().or(self.error.as_ref()) {
            return Some(
                text(error.clone())
                    .size(13)
                    .color(palette.danger.base.color)
                    .into(),
            );
        }

        if let Some(status) = &self.status {
            return Some(text(status.clone()).size(13).into());
        }

        if self.worker.state.model == ModelState::Ready {
            let name = self
                .worker
                .state
                .loaded_model
                .map(|m| m.id)
                .unwrap_or("model");
            return Some(
                text(format!("{name} loaded \u{2014} ready to transcribe"))
                    .size(13)
                    .color(palette.success.base.color)
                    .into(),
            );
        }

        None
    }

    fn transcribe_area(&self, theme: &Theme) -> Element<'_, Message> {
        let tertiary = theme::tertiary_color(theme);
        let busy = self.worker.state.transcribe == TranscribeState::Busy;

        let label = if busy {
            "Transcribing\u{2026}"
        } else {
            "Transcribe"
        };

        let on_press = self.can_transcribe().then_some(Message::Transcribe);

        let btn = primary_button::primary_button(
            move || {
                text(label)
                    .size(15)
                    .color(iced::Color::WHITE)
                    .width(Length::Fill)
                    .align_x(iced::Alignment::Center)
                    .into()
            },
            on_press,
            self.transcribe_hovered,
            Message::TranscribeHover,
            [12, 24],
            Length::Fill,
        );

        let mut col = column![btn].spacing(0);

        if busy {
            col = col
                .push(Space::new().height(10))
                .push(
                    container(text("Processing audio\u{2026}").size(13).color(tertiary))
                        .width(Length::Fill)
                        .center_x(Length::Fill),
                );

            if let Some(partial) = &self.worker.state.partial {
                col = col.push(Space::new().height(8)).push(
                    container(text(partial.clone()).size(13).color(tertiary))
                        .padding([10, 12])
                        .width(Length::Fill)
                        .style(container::rounded_box),
                );
            }
        }

        col.into()
    }
}

async fn save_dialog(format: ExportFormat) -> Option<PathBuf> {
    let dialog = rfd::AsyncFileDialog::new().set_title("Save transcript");
    let dialog = match format {
        ExportFormat::Txt => dialog
            .set_file_name("transcription.txt")
            .add_filter("Text", &["txt"]),
        ExportFormat::Srt => dialog
            .set_file_name("transcription.srt")
            .add_filter("SubRip", &["srt"]),
    };
    dialog.save_file().await.map(|h| h.path().to_path_buf())
}

fn has_audio_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App {
            active_tab: Tab::Record,
            settings: Settings::default(),
            worker: InferenceWorker::spawn(),
            selected_model: *model_catalog::default_model(),
            selected_device: Device::Cpu,
            audio_source: None,
            recorder: None,
            record_seconds: 0,
            waveform: Vec::new(),
            record_error: None,
            drag_over: false,
            decoding: false,
            transcribe_hovered: false,
            result: None,
            viewing: None,
            history: HistoryStore::open(
                std::env::temp_dir().join(format!("murmur-app-test-{}.json", std::process::id())),
            ),
            error: None,
            status: None,
        }
    }

    fn take() -> SampleBuffer {
        SampleBuffer::new(vec![0.0; 16000], 16000)
    }

    fn make_model_ready(app: &mut App) {
        app.worker.state.apply(&WorkerEvent::Loading);
        app.worker.state.apply(&WorkerEvent::Ready);
    }

    #[test]
    fn test_selecting_file_clears_recorded_take() {
        let mut app = test_app();
        app.set_recording_source(take());
        assert!(matches!(app.audio_source, Some(AudioSource::Recording(_))));

        app.set_file_source(PathBuf::from("/tmp/speech.wav"));
        assert!(matches!(app.audio_source, Some(AudioSource::File(_))));
    }

    #[test]
    fn test_finished_take_clears_selected_file() {
        let mut app = test_app();
        app.set_file_source(PathBuf::from("/tmp/speech.wav"));
        app.set_recording_source(take());
        assert!(matches!(app.audio_source, Some(AudioSource::Recording(_))));
    }

    #[test]
    fn test_transcribe_disabled_without_ready_model() {
        let mut app = test_app();
        app.set_recording_source(take());
        assert!(!app.can_transcribe());
    }

    #[test]
    fn test_transcribe_disabled_without_source() {
        let mut app = test_app();
        make_model_ready(&mut app);
        assert!(!app.can_transcribe());
    }

    #[test]
    fn test_transcribe_disabled_while_busy() {
        let mut app = test_app();
        make_model_ready(&mut app);
        app.set_recording_source(take());
        assert!(app.can_transcribe());

        app.worker.state.apply(&WorkerEvent::Transcribing);
        assert!(!app.can_transcribe());
    }

    #[test]
    fn test_transcribe_consumes_the_source() {
        let mut app = test_app();
        make_model_ready(&mut app);
        app.set_recording_source(take());

        let _ = app.update(Message::Transcribe);
        assert!(app.audio_source.is_none());
        assert_eq!(app.worker.state.transcribe, TranscribeState::Busy);
    }

    #[test]
    fn test_dropped_non_audio_file_is_rejected() {
        let mut app = test_app();
        let _ = app.update(Message::FileDropped(PathBuf::from("/tmp/report.pdf")));
        assert!(app.audio_source.is_none());
        assert!(app.error.is_some());
    }

    #[test]
    fn test_dropped_audio_file_becomes_source_and_switches_tab() {
        let mut app = test_app();
        let _ = app.update(Message::FileDropped(PathBuf::from("/tmp/take.MP3")));
        assert!(matches!(app.audio_source, Some(AudioSource::File(_))));
        assert_eq!(app.active_tab, Tab::Upload);
    }
}
