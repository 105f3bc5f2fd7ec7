use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use murmur_core::audio::domain::sample_buffer::SampleBuffer;
use murmur_core::shared::model_catalog::ModelSpec;
use murmur_core::shared::model_resolver;
use murmur_core::transcription::domain::device::Device;
use murmur_core::transcription::domain::transcriber::Transcriber;
use murmur_core::transcription::domain::transcript::Transcription;
use murmur_core::transcription::infrastructure::whisper_transcriber::WhisperTranscriber;

/// Requests sent from the UI to the inference worker.
pub enum WorkerRequest {
    Load { model: ModelSpec, device: Device },
    /// Ownership of the samples moves to the worker.
    Transcribe { audio: SampleBuffer },
}

/// Events sent from the worker back to the UI.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Loading,
    Progress { file: String, percent: f32 },
    Ready,
    Transcribing,
    Partial(String),
    Complete(Transcription),
    Error(String),
}

/// Model lifecycle as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Transcription lifecycle as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeState {
    Idle,
    Busy,
}

/// Caller-side view of the worker: the request guards plus the state
/// transitions driven by incoming events.
///
/// The UI never talks to the worker directly; it asks the proxy, and the
/// proxy rejects anything the state machines forbid before a request is
/// ever sent.
#[derive(Debug)]
pub struct ProxyState {
    pub model: ModelState,
    pub transcribe: TranscribeState,
    /// Download progress per artifact file, 0–100.
    pub progress: HashMap<String, f32>,
    /// Best-effort intermediate text while a transcription is running.
    pub partial: Option<String>,
    pub loaded_model: Option<ModelSpec>,
    pub last_error: Option<String>,
    pending_model: Option<ModelSpec>,
}

impl ProxyState {
    fn new() -> Self {
        Self {
            model: ModelState::Idle,
            transcribe: TranscribeState::Idle,
            progress: HashMap::new(),
            partial: None,
            loaded_model: None,
            last_error: None,
            pending_model: None,
        }
    }

    /// A load may be issued unless one is already in flight or a
    /// transcription is running.
    pub fn can_load(&self) -> bool {
        self.model != ModelState::Loading && self.transcribe == TranscribeState::Idle
    }

    /// A transcription may be issued only against a ready model, one at a
    /// time.
    pub fn can_transcribe(&self) -> bool {
        self.model == ModelState::Ready && self.transcribe == TranscribeState::Idle
    }

    /// Caller-side transition when a load request is accepted. The worker
    /// echoes `Loading` but the UI must reflect the in-flight load before
    /// the first poll.
    fn note_load_requested(&mut self, model: ModelSpec) {
        self.model = ModelState::Loading;
        self.pending_model = Some(model);
        self.progress.clear();
        self.last_error = None;
    }

    /// Caller-side transition when a transcribe request is accepted.
    fn note_transcribe_requested(&mut self) {
        self.transcribe = TranscribeState::Busy;
        self.partial = None;
        self.last_error = None;
    }

    pub fn apply(&mut self, event: &WorkerEvent) {
        match event {
            WorkerEvent::Loading => {
                self.model = ModelState::Loading;
            }
            WorkerEvent::Progress { file, percent } => {
                if self.model == ModelState::Loading {
                    self.progress.insert(file.clone(), *percent);
                }
            }
            WorkerEvent::Ready => {
                self.model = ModelState::Ready;
                self.loaded_model = self.pending_model.take();
                self.progress.clear();
            }
            WorkerEvent::Transcribing => {
                self.transcribe = TranscribeState::Busy;
            }
            WorkerEvent::Partial(text) => {
                if self.transcribe == TranscribeState::Busy {
                    self.partial = Some(text.clone());
                }
            }
            WorkerEvent::Complete(_) => {
                self.transcribe = TranscribeState::Idle;
                self.partial = None;
            }
            WorkerEvent::Error(message) => {
                // A failure while loading is terminal for the model; a
                // failure while transcribing returns to idle with the
                // model still ready.
                if self.model == ModelState::Loading {
                    self.model = ModelState::Error;
                    self.pending_model = None;
                    self.progress.clear();
                }
                self.transcribe = TranscribeState::Idle;
                self.partial = None;
                self.last_error = Some(message.clone());
            }
        }
    }
}

/// Handle owned by the UI thread. The worker runs on its own thread and
/// the two sides share nothing but these channels; the thread exits when
/// the handle (and with it the request sender) is dropped.
pub struct InferenceWorker {
    requests: Sender<WorkerRequest>,
    events: Receiver<WorkerEvent>,
    pub state: ProxyState,
}

impl InferenceWorker {
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<WorkerRequest>();
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<WorkerEvent>();

        thread::spawn(move || run_worker(&req_rx, &event_tx));

        Self {
            requests: req_tx,
            events: event_rx,
            state: ProxyState::new(),
        }
    }

    /// Ask the worker to load a model. Returns false if the state machine
    /// rejects the request; nothing is sent in that case.
    pub fn request_load(&mut self, model: ModelSpec, device: Device) -> bool {
        if !self.state.can_load() {
            return false;
        }
        self.state.note_load_requested(model);
        self.requests
            .send(WorkerRequest::Load { model, device })
            .is_ok()
    }

    /// Hand an audio buffer to the worker. Ownership of the samples moves;
    /// returns false if the state machine rejects the request.
    pub fn request_transcribe(&mut self, audio: SampleBuffer) -> bool {
        if !self.state.can_transcribe() {
            return false;
        }
        self.state.note_transcribe_requested();
        self.requests
            .send(WorkerRequest::Transcribe { audio })
            .is_ok()
    }

    /// Drain pending events, updating the proxy state. The raw events are
    /// returned so the caller can react to `Ready` and `Complete`.
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.state.apply(&event);
                    drained.push(event);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// True while the UI should keep polling for events.
    pub fn is_active(&self) -> bool {
        self.state.model == ModelState::Loading || self.state.transcribe == TranscribeState::Busy
    }
}

fn run_worker(requests: &Receiver<WorkerRequest>, events: &Sender<WorkerEvent>) {
    let mut transcriber: Option<WhisperTranscriber> = None;

    for request in requests {
        match request {
            WorkerRequest::Load { model, device } => {
                // Release the previous context before loading the next one
                transcriber = None;
                let _ = events.send(WorkerEvent::Loading);
                match load_model(model, device, events) {
                    Ok(t) => {
                        transcriber = Some(t);
                        let _ = events.send(WorkerEvent::Ready);
                    }
                    Err(e) => {
                        log::error!("model load failed: {e}");
                        let _ = events.send(WorkerEvent::Error(e));
                    }
                }
            }
            WorkerRequest::Transcribe { audio } => {
                let Some(ref transcriber) = transcriber else {
                    let _ = events.send(WorkerEvent::Error("model not loaded".to_string()));
                    continue;
                };
                let _ = events.send(WorkerEvent::Transcribing);
                match run_transcription(transcriber, &audio, events) {
                    Ok(result) => {
                        let _ = events.send(WorkerEvent::Complete(result));
                    }
                    Err(e) => {
                        log::error!("transcription failed: {e}");
                        let _ = events.send(WorkerEvent::Error(e));
                    }
                }
            }
        }
    }
}

fn load_model(
    model: ModelSpec,
    device: Device,
    events: &Sender<WorkerEvent>,
) -> Result<WhisperTranscriber, String> {
    let events_dl = events.clone();
    let file = model.file_name.to_string();
    let path = model_resolver::resolve(
        &model,
        Some(Box::new(move |downloaded, total| {
            if total > 0 {
                let percent = (downloaded as f64 / total as f64 * 100.0) as f32;
                let _ = events_dl.send(WorkerEvent::Progress {
                    file: file.clone(),
                    percent: percent.min(100.0),
                });
            }
        })),
    )
    .map_err(|e| e.to_string())?;

    WhisperTranscriber::new(&path, device, model.english_only).map_err(|e| e.to_string())
}

fn run_transcription(
    transcriber: &WhisperTranscriber,
    audio: &SampleBuffer,
    events: &Sender<WorkerEvent>,
) -> Result<Transcription, String> {
    let events_partial = events.clone();
    let fired = Arc::new(AtomicBool::new(false));
    let fired_in_callback = fired.clone();
    let mut partial = String::new();

    let result = transcriber
        .transcribe(
            audio,
            Some(Box::new(move |chunk| {
                fired_in_callback.store(true, Ordering::Relaxed);
                if !partial.is_empty() {
                    partial.push(' ');
                }
                partial.push_str(chunk.text.trim());
                let _ = events_partial.send(WorkerEvent::Partial(partial.clone()));
            })),
        )
        .map_err(|e| e.to_string())?;

    // Some model configurations never invoke the segment callback; the
    // final result is unaffected, so stay quiet in the UI.
    if !fired.load(Ordering::Relaxed) {
        log::warn!("segment callback never fired; partial text was unavailable");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::shared::model_catalog;

    fn model() -> ModelSpec {
        *model_catalog::default_model()
    }

    fn loading_state() -> ProxyState {
        let mut state = ProxyState::new();
        state.note_load_requested(model());
        state
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = ProxyState::new();
        assert_eq!(state.model, ModelState::Idle);
        assert_eq!(state.transcribe, TranscribeState::Idle);
        assert!(state.can_load());
        assert!(!state.can_transcribe());
    }

    #[test]
    fn test_load_rejected_while_loading() {
        let state = loading_state();
        assert_eq!(state.model, ModelState::Loading);
        assert!(!state.can_load());
    }

    #[test]
    fn test_load_rejected_while_transcribing() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Ready);
        state.note_transcribe_requested();
        assert!(!state.can_load());
        assert!(!state.can_transcribe());
    }

    #[test]
    fn test_load_permitted_again_after_ready_and_after_error() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Ready);
        assert!(state.can_load());

        state.note_load_requested(model());
        state.apply(&WorkerEvent::Error("boom".to_string()));
        assert_eq!(state.model, ModelState::Error);
        assert!(state.can_load());
    }

    #[test]
    fn test_ready_records_loaded_model_and_clears_progress() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Progress {
            file: "ggml-base.bin".to_string(),
            percent: 40.0,
        });
        assert_eq!(state.progress.len(), 1);

        state.apply(&WorkerEvent::Ready);
        assert_eq!(state.model, ModelState::Ready);
        assert_eq!(state.loaded_model, Some(model()));
        assert!(state.progress.is_empty());
    }

    #[test]
    fn test_progress_ignored_when_not_loading() {
        let mut state = ProxyState::new();
        state.apply(&WorkerEvent::Progress {
            file: "ggml-base.bin".to_string(),
            percent: 10.0,
        });
        assert!(state.progress.is_empty());
    }

    #[test]
    fn test_new_load_resets_progress() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Progress {
            file: "ggml-base.bin".to_string(),
            percent: 99.0,
        });
        state.apply(&WorkerEvent::Ready);

        state.note_load_requested(model());
        assert!(state.progress.is_empty());
    }

    #[test]
    fn test_transcription_round_trip() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Ready);
        assert!(state.can_transcribe());

        state.note_transcribe_requested();
        state.apply(&WorkerEvent::Transcribing);
        assert_eq!(state.transcribe, TranscribeState::Busy);

        state.apply(&WorkerEvent::Partial("hel".to_string()));
        assert_eq!(state.partial.as_deref(), Some("hel"));

        state.apply(&WorkerEvent::Complete(Transcription {
            text: "hello".to_string(),
            chunks: Vec::new(),
        }));
        assert_eq!(state.transcribe, TranscribeState::Idle);
        assert!(state.partial.is_none());
        assert!(state.can_transcribe());
    }

    #[test]
    fn test_partial_ignored_while_idle() {
        let mut state = ProxyState::new();
        state.apply(&WorkerEvent::Partial("stray".to_string()));
        assert!(state.partial.is_none());
    }

    #[test]
    fn test_error_while_busy_keeps_model_ready() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Ready);
        state.note_transcribe_requested();

        state.apply(&WorkerEvent::Error("inference exploded".to_string()));
        assert_eq!(state.model, ModelState::Ready);
        assert_eq!(state.transcribe, TranscribeState::Idle);
        assert_eq!(state.last_error.as_deref(), Some("inference exploded"));
    }

    #[test]
    fn test_error_while_loading_is_terminal_for_model() {
        let mut state = loading_state();
        state.apply(&WorkerEvent::Error("404".to_string()));
        assert_eq!(state.model, ModelState::Error);
        assert!(state.loaded_model.is_none());
        assert!(!state.can_transcribe());
    }

    #[test]
    fn test_worker_rejects_transcribe_before_load() {
        let mut worker = InferenceWorker::spawn();
        let accepted =
            worker.request_transcribe(SampleBuffer::new(vec![0.0; 16000], 16000));
        assert!(!accepted);
    }
}
