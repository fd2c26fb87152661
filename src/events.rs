use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::warn;

/// TUI-specific events (keyboard, mouse, etc.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Key press event
    Key(KeyEvent),

    /// Mouse event
    Mouse(MouseEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),

    /// Animation tick
    Tick,
}

impl TuiEvent {
    /// Translate a terminal event. Key releases and focus changes are dropped.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(TuiEvent::Key(key)),
            Event::Key(_) => None,
            Event::Mouse(mouse) => Some(TuiEvent::Mouse(mouse)),
            Event::Paste(text) => Some(TuiEvent::Paste(text)),
            Event::Resize(w, h) => Some(TuiEvent::Resize(w, h)),
            Event::FocusGained | Event::FocusLost => None,
        }
    }
}

/// Merges terminal input and a tick timer into one channel
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<TuiEvent>,
    _tx: mpsc::UnboundedSender<TuiEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(event) = reader.next().await {
                match event {
                    Ok(event) => {
                        if let Some(event) = TuiEvent::from_terminal(event) {
                            if tx_events.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "terminal event stream failed");
                        break;
                    }
                }
            }
        });

        let tx_tick = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tx_tick.send(TuiEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }
}
