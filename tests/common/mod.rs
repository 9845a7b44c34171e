//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use handcount::capture::{CaptureError, Frame, FrameSource};
use handcount::display::DisplaySink;
use handcount::recognition::{
    AnnotatedImage, HandLabel, HandReading, Recognition, RecognitionError, Recognizer,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Frame source that counts acquire/release calls
#[derive(Clone, Default)]
pub struct SourceProbe {
    pub acquires: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl SourceProbe {
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

pub struct CountingFrameSource {
    probe: SourceProbe,
    fail_acquire: bool,
    held: AtomicBool,
    /// First `current_frame` call blocks this long after signalling
    first_frame_stall: Option<(Duration, mpsc::UnboundedSender<()>)>,
}

impl CountingFrameSource {
    pub fn new(probe: SourceProbe) -> Self {
        Self {
            probe,
            fail_acquire: false,
            held: AtomicBool::new(false),
            first_frame_stall: None,
        }
    }

    /// Make the first frame read slow, signalling `started` when it begins
    pub fn with_first_frame_stall(
        mut self,
        stall: Duration,
        started: mpsc::UnboundedSender<()>,
    ) -> Self {
        self.first_frame_stall = Some((stall, started));
        self
    }

    pub fn failing(probe: SourceProbe) -> Self {
        Self {
            fail_acquire: true,
            ..Self::new(probe)
        }
    }
}

impl FrameSource for CountingFrameSource {
    fn acquire(&mut self, _width: u32, _height: u32) -> Result<(), CaptureError> {
        self.probe.acquires.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire {
            return Err(CaptureError::DeviceUnavailable("permission denied".to_string()));
        }
        if self.held.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyAcquired);
        }
        Ok(())
    }

    fn current_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.held.load(Ordering::SeqCst) {
            return Err(CaptureError::NotReady);
        }
        if let Some((stall, started)) = self.first_frame_stall.take() {
            let _ = started.send(());
            std::thread::sleep(stall);
        }
        Ok(Frame::new(32, 24, vec![90; 32 * 24 * 3]))
    }

    fn release(&mut self) {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        self.held.store(false, Ordering::SeqCst);
    }

    fn is_acquired(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

pub fn recognition(left: Option<u8>, right: Option<u8>) -> Recognition {
    let mut hands = Vec::new();
    if let Some(digit) = left {
        hands.push(HandReading {
            label: HandLabel::Left,
            digit,
        });
    }
    if let Some(digit) = right {
        hands.push(HandReading {
            label: HandLabel::Right,
            digit,
        });
    }
    Recognition {
        annotated_image: AnnotatedImage("data:image/jpeg;base64,/9j/4A==".to_string()),
        hands,
    }
}

/// One scripted recognizer answer
pub enum Step {
    /// Answer after `delay`
    Reply {
        delay: Duration,
        result: Result<Recognition, RecognitionError>,
    },
    /// Answer once the paired sender fires
    Gated {
        release: oneshot::Receiver<()>,
        result: Result<Recognition, RecognitionError>,
    },
}

impl Step {
    pub fn ok(delay_ms: u64, left: Option<u8>, right: Option<u8>) -> Self {
        Step::Reply {
            delay: Duration::from_millis(delay_ms),
            result: Ok(recognition(left, right)),
        }
    }

    pub fn err(error: RecognitionError) -> Self {
        Step::Reply {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn gated(left: Option<u8>, right: Option<u8>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Step::Gated {
                release: rx,
                result: Ok(recognition(left, right)),
            },
            tx,
        )
    }
}

/// Recognizer that plays back a script and then hangs forever
pub struct ScriptedRecognizer {
    steps: Mutex<VecDeque<Step>>,
    sizes: Mutex<Vec<(u32, u32)>>,
    calls: AtomicUsize,
    entered: mpsc::UnboundedSender<usize>,
}

impl ScriptedRecognizer {
    /// Returns the recognizer and a receiver that yields the call number
    /// each time a request arrives
    pub fn new(steps: Vec<Step>) -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        let (entered, rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(Self {
            steps: Mutex::new(steps.into()),
            sizes: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            entered,
        });
        (recognizer, rx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Dimensions of every JPEG received, in order
    pub fn sizes(&self) -> Vec<(u32, u32)> {
        self.sizes.lock().clone()
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn recognize(&self, image: Vec<u8>) -> Result<Recognition, RecognitionError> {
        let decoded = image::load_from_memory(&image).expect("driver sent a valid JPEG");
        self.sizes.lock().push((decoded.width(), decoded.height()));

        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.entered.send(call);

        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Reply { delay, result }) => {
                tokio::time::sleep(delay).await;
                result
            }
            Some(Step::Gated { release, result }) => {
                let _ = release.await;
                result
            }
            None => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Latency(u64),
    Digits(Option<u8>, Option<u8>),
    Image(String),
    Fps(u32),
    Running(bool),
    Notice(String),
}

#[derive(Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().clone()
    }

    pub fn latencies(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Latency(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DisplayEvent) {
        self.events.lock().push(event);
    }
}

impl DisplaySink for RecordingDisplay {
    fn show_latency(&self, latency_ms: u64) {
        self.push(DisplayEvent::Latency(latency_ms));
    }

    fn show_digits(&self, left: Option<u8>, right: Option<u8>) {
        self.push(DisplayEvent::Digits(left, right));
    }

    fn show_annotated_image(&self, image: &AnnotatedImage) {
        self.push(DisplayEvent::Image(image.as_str().to_string()));
    }

    fn show_fps(&self, fps: u32) {
        self.push(DisplayEvent::Fps(fps));
    }

    fn show_running(&self, running: bool) {
        self.push(DisplayEvent::Running(running));
    }

    fn notify(&self, message: &str) {
        self.push(DisplayEvent::Notice(message.to_string()));
    }
}

/// Which display call blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallOn {
    Latency,
    Fps,
}

/// Recording display whose first `stall_on` call signals and then blocks
/// its thread, so tests can act while an update is half applied
pub struct StallingDisplay {
    pub inner: RecordingDisplay,
    stall_on: StallOn,
    stall: Duration,
    started: Mutex<Option<mpsc::UnboundedSender<()>>>,
}

impl StallingDisplay {
    pub fn new(
        stall_on: StallOn,
        stall: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let display = Arc::new(Self {
            inner: RecordingDisplay::default(),
            stall_on,
            stall,
            started: Mutex::new(Some(tx)),
        });
        (display, rx)
    }

    fn maybe_stall(&self, call: StallOn) {
        if call != self.stall_on {
            return;
        }
        let started = self.started.lock().take();
        if let Some(started) = started {
            let _ = started.send(());
            std::thread::sleep(self.stall);
        }
    }
}

impl DisplaySink for StallingDisplay {
    fn show_latency(&self, latency_ms: u64) {
        self.maybe_stall(StallOn::Latency);
        self.inner.show_latency(latency_ms);
    }

    fn show_digits(&self, left: Option<u8>, right: Option<u8>) {
        self.inner.show_digits(left, right);
    }

    fn show_annotated_image(&self, image: &AnnotatedImage) {
        self.inner.show_annotated_image(image);
    }

    fn show_fps(&self, fps: u32) {
        self.maybe_stall(StallOn::Fps);
        self.inner.show_fps(fps);
    }

    fn show_running(&self, running: bool) {
        self.inner.show_running(running);
    }

    fn notify(&self, message: &str) {
        self.inner.notify(message);
    }
}
