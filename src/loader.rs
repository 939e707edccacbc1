use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Time to wait before anything is drawn, so fast calls never flicker.
    pub delay: Duration,
    /// Time between animation frames.
    pub interval: Duration,
    pub message: String,
    /// Characters revealed one at a time after the message.
    pub trail: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            interval: Duration::from_millis(400),
            message: "Downloading".into(),
            trail: "...".into(),
        }
    }
}

impl LoaderOptions {
    fn frames(&self) -> Vec<String> {
        let trail: Vec<char> = self.trail.chars().collect();
        (0..=trail.len())
            .map(|len| {
                let mut frame = self.message.clone();
                frame.extend(&trail[..len]);
                frame
            })
            .collect()
    }
}

/// Surface the loading animation is drawn on.
pub trait Indicator: Send + Sync {
    fn draw(&self, frame: &str);
    fn clear(&self);
}

/// Draws nothing. Used when stderr is not a terminal and in tests.
#[derive(Debug, Default)]
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn draw(&self, _frame: &str) {}

    fn clear(&self) {}
}

/// Spinner line on stderr.
#[derive(Default)]
pub struct SpinnerIndicator {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_bar() -> ProgressBar {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style =
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar
    }
}

impl Indicator for SpinnerIndicator {
    fn draw(&self, frame: &str) {
        let mut guard = self.bar.lock();
        let bar = guard.get_or_insert_with(Self::make_bar);
        bar.set_message(frame.to_string());
        bar.tick();
    }

    fn clear(&self) {
        if let Some(bar) = self.bar.lock().take() {
            bar.finish_and_clear();
        }
    }
}

/// Runs blocking calls while an indicator animates on a helper thread.
///
/// The call itself stays on the caller's thread. The helper thread only draws,
/// and it is stopped and joined before [`Loader::run`] returns, including when
/// the call fails or panics. Scopes do not nest: starting one while another is
/// active on the same loader panics.
pub struct Loader {
    indicator: Arc<dyn Indicator>,
    options: LoaderOptions,
    active: AtomicBool,
    exception: Mutex<Option<String>>,
}

impl Loader {
    pub fn new(indicator: Arc<dyn Indicator>, options: LoaderOptions) -> Self {
        Self {
            indicator,
            options,
            active: AtomicBool::new(false),
            exception: Mutex::new(None),
        }
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(NullIndicator), LoaderOptions::default())
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Error text captured from the most recent scope, if it failed.
    pub fn exception(&self) -> Option<String> {
        self.exception.lock().clone()
    }

    pub fn run<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.run_with(&self.options, action)
    }

    pub fn run_with<T, F>(&self, options: &LoaderOptions, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let nested = self.active.swap(true, Ordering::AcqRel);
        assert!(!nested, "loader: nested guard scopes are not supported");
        let _scope = Scope {
            active: &self.active,
        };

        *self.exception.lock() = None;
        debug!(message = %options.message, "loader scope started");

        let animation = Animation::start(self.indicator.clone(), options.clone());
        let result = action();
        drop(animation);

        if let Err(err) = &result {
            warn!(error = %format!("{err:#}"), "guarded call failed");
            *self.exception.lock() = Some(format!("{err:#}"));
        }
        result
    }
}

struct Scope<'a> {
    active: &'a AtomicBool,
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

struct Animation {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Animation {
    fn start(indicator: Arc<dyn Indicator>, options: LoaderOptions) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::spawn(move || animate(indicator.as_ref(), &options, &stop_rx));
        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        // Disconnecting the channel is the stop signal.
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn animate(indicator: &dyn Indicator, options: &LoaderOptions, stop: &Receiver<()>) {
    if stopped(stop, options.delay) {
        return;
    }
    for frame in options.frames().iter().cycle() {
        indicator.draw(frame);
        if stopped(stop, options.interval) {
            break;
        }
    }
    indicator.clear();
}

fn stopped(stop: &Receiver<()>, wait: Duration) -> bool {
    !matches!(stop.recv_timeout(wait), Err(RecvTimeoutError::Timeout))
}
