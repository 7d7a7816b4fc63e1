// ABOUTME: Interactive browser loop multiplexing keys, render ticks, fetches and interrupts
// ABOUTME: Owns the frame cache and the preview driver; fetch results for stale selections are cached only

pub mod render;
pub mod state;

pub use render::{Layout, PreviewPlacement, fit_preview, layout};
pub use state::{AppState, BrowserItem};

use crate::constants::timeouts;
use crate::image_protocols::{FetchError, Fetcher, FrameCache, InlineProtocol};
use crate::preview::{ImageId, PreviewConfig, PreviewDriver};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use futures_util::{Stream, StreamExt};
use gifpeek_decode::DecodeLimits;
use log::{debug, warn};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("browse needs an interactive terminal on stdin and stdout")]
    NotTerminal,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Raw-mode setup, restore and size query for the controlling terminal
pub trait TerminalHost {
    fn enter(&mut self) -> io::Result<()>;
    fn leave(&mut self) -> io::Result<()>;
    fn size(&self) -> io::Result<(u16, u16)>;
}

#[derive(Debug, Default)]
pub struct CrosstermHost {
    active: bool,
}

impl CrosstermHost {
    pub fn new() -> Result<Self, BrowseError> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            return Err(BrowseError::NotTerminal);
        }
        Ok(Self::default())
    }
}

impl TerminalHost for CrosstermHost {
    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let restored = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        terminal::disable_raw_mode()?;
        restored
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for CrosstermHost {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Next,
    Previous,
    First,
    Last,
    Reload,
    Quit,
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => KeyAction::Next,
        KeyCode::Char('k') | KeyCode::Up => KeyAction::Previous,
        KeyCode::Char('g') | KeyCode::Home => KeyAction::First,
        KeyCode::Char('G') | KeyCode::End => KeyAction::Last,
        KeyCode::Char('r') => KeyAction::Reload,
        _ => KeyAction::Ignore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A finished fetch, tagged with the activation it was issued for
#[derive(Debug)]
pub struct FetchDone {
    pub id: ImageId,
    pub source: String,
    pub result: Result<Vec<u8>, FetchError>,
}

pub struct Browser<F: Fetcher + 'static> {
    state: AppState,
    driver: PreviewDriver,
    cache: FrameCache,
    fetcher: Arc<F>,
    limits: DecodeLimits,
    fetch_tx: mpsc::UnboundedSender<FetchDone>,
    fetch_rx: mpsc::UnboundedReceiver<FetchDone>,
}

impl<F: Fetcher + 'static> Browser<F> {
    pub fn new(state: AppState, fetcher: Arc<F>, config: PreviewConfig, limits: DecodeLimits) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        Self {
            state,
            driver: PreviewDriver::new(config),
            cache: FrameCache::new(),
            fetcher,
            limits,
            fetch_tx,
            fetch_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn driver(&self) -> &PreviewDriver {
        &self.driver
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Start previewing the selected item: from the cache when possible, otherwise by
    /// spawning a fetch
    pub fn activate<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(source) = self.state.selected().map(|item| item.source.clone()) else {
            return self.driver.clear(out);
        };
        if self.driver.config().protocol == InlineProtocol::None {
            return Ok(());
        }

        let id = self.driver.select(out)?;
        self.state.mark_dirty();

        if self.cache.contains(&source) {
            debug!("cache hit for {source}");
            self.apply_cached(id, &source);
            return Ok(());
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&source).await;
            // The receiver only goes away when the browser is torn down
            let _ = tx.send(FetchDone { id, source, result });
        });
        Ok(())
    }

    /// Cache a finished fetch and apply it if its activation is still current
    pub fn fetch_finished(&mut self, done: FetchDone) {
        let FetchDone { id, source, result } = done;
        match result {
            Ok(bytes) => {
                self.cache.put(source.clone(), bytes, None);
                if self.driver.pending() == Some(id) {
                    self.apply_cached(id, &source);
                } else {
                    debug!("cached {source} for stale image {id}");
                }
            }
            Err(err) => {
                warn!("fetch failed for {source}: {err}");
                if self.driver.load_failed(id) {
                    self.state.set_status(format!("Fetch failed: {err}"));
                }
            }
        }
    }

    /// Wait for the next spawned fetch to finish
    pub async fn next_fetch(&mut self) -> Option<FetchDone> {
        self.fetch_rx.recv().await
    }

    pub fn handle_event<W: Write>(&mut self, out: &mut W, event: Event) -> io::Result<Flow> {
        match event {
            Event::Key(key) => {
                let changed = match key_action(&key) {
                    KeyAction::Quit => return Ok(Flow::Quit),
                    KeyAction::Next => self.state.select_next(),
                    KeyAction::Previous => self.state.select_previous(),
                    KeyAction::First => self.state.select_first(),
                    KeyAction::Last => self.state.select_last(),
                    KeyAction::Reload => true,
                    KeyAction::Ignore => false,
                };
                if changed {
                    self.activate(out)?;
                }
            }
            Event::Resize(..) => {
                queue!(out, Clear(ClearType::All))?;
                self.driver.invalidate();
                self.state.mark_dirty();
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    pub fn render<W: Write>(&mut self, out: &mut W, size: (u16, u16), now: Instant) -> io::Result<()> {
        render::draw(out, &mut self.state, &mut self.driver, size, now)?;
        out.flush()
    }

    fn needs_render(&self) -> bool {
        self.state.is_dirty() || self.driver.needs_draw()
    }

    fn apply_cached(&mut self, id: ImageId, source: &str) {
        match self.cache.preview_source(source, self.driver.needs_frames(), &self.limits) {
            Ok(Some(preview)) => {
                self.driver.load_complete(id, preview);
                self.state.clear_status();
            }
            Ok(None) => {}
            Err(err) => {
                warn!("decode failed for {source}: {err}");
                self.driver.load_failed(id);
                self.state.set_status(format!("Decode failed: {err}"));
            }
        }
        self.state.mark_dirty();
    }

    /// Run the session until quit, end of input or `shutdown` resolves. The terminal is
    /// restored and any live image deleted on every exit path.
    pub async fn run<W, H, S, Q>(&mut self, out: &mut W, host: &mut H, events: S, shutdown: Q) -> Result<(), BrowseError>
    where
        W: Write,
        H: TerminalHost,
        S: Stream<Item = io::Result<Event>> + Unpin,
        Q: Future<Output = ()>,
    {
        host.enter()?;
        let result = self.event_loop(out, host, events, shutdown).await;

        let cleanup = self.driver.shutdown(out).and_then(|_| out.flush());
        let restored = host.leave();
        result?;
        cleanup?;
        restored?;
        Ok(())
    }

    async fn event_loop<W, H, S, Q>(&mut self, out: &mut W, host: &mut H, mut events: S, shutdown: Q) -> io::Result<()>
    where
        W: Write,
        H: TerminalHost,
        S: Stream<Item = io::Result<Event>> + Unpin,
        Q: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(timeouts::RENDER_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        self.activate(out)?;
        self.render(out, host.size()?, Instant::now())?;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("interrupted");
                    break;
                }
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if self.handle_event(out, event)? == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(err)) => return Err(err),
                    None => break,
                },
                Some(done) = self.fetch_rx.recv() => self.fetch_finished(done),
                _ = ticker.tick() => {
                    if self.driver.tick(out, Instant::now())? {
                        out.flush()?;
                    }
                }
            }

            if self.needs_render() {
                self.render(out, host.size()?, Instant::now())?;
            }
        }
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM. A handler that cannot be installed never fires.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for interrupt: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => debug!("received interrupt"),
        _ = terminate => debug!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(&press(KeyCode::Char('j'))), KeyAction::Next);
        assert_eq!(key_action(&press(KeyCode::Down)), KeyAction::Next);
        assert_eq!(key_action(&press(KeyCode::Char('k'))), KeyAction::Previous);
        assert_eq!(key_action(&press(KeyCode::Char('g'))), KeyAction::First);
        assert_eq!(key_action(&press(KeyCode::Char('G'))), KeyAction::Last);
        assert_eq!(key_action(&press(KeyCode::Char('r'))), KeyAction::Reload);
        assert_eq!(key_action(&press(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(key_action(&press(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(
            key_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(key_action(&press(KeyCode::Char('c'))), KeyAction::Ignore);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_action(&key), KeyAction::Ignore);
    }
}
