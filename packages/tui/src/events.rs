use crossterm::event::{self, Event, KeyEvent};
use std::time::{Duration, Instant};
use telcome_api::{ApiError, AuthResponse, Bill, Ticket, UnknownMessage};
use telcome_session::User;
use tokio::sync::mpsc;

/// Result of a background API call, stamped with the state generation it
/// was spawned under so stale arrivals can be dropped.
#[derive(Debug)]
pub enum ApiOutcome {
    Auth(Result<AuthResponse, ApiError>),
    Registered(Result<(), ApiError>),
    Tickets(Result<Vec<Ticket>, ApiError>),
    Users(Result<Vec<User>, ApiError>),
    Bills(Result<Vec<Bill>, ApiError>),
    UnknownMessages(Result<Vec<UnknownMessage>, ApiError>),
    ReplySaved(Result<(), ApiError>),
    TicketSaved(Result<Ticket, ApiError>),
    BillSaved(Result<Bill, ApiError>),
    /// A delete or user update finished; the list is refetched on success.
    Mutated(Result<(), ApiError>),
    /// Bot round trip; `input` is carried along so the fallback engine can
    /// answer it locally when the remote call failed.
    Bot {
        input: String,
        result: Result<String, ApiError>,
    },
}

/// Event types for the TUI application
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Api { generation: u64, outcome: ApiOutcome },
}

/// Event handler for user input, ticks, and completed API calls
pub struct EventHandler {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate);
        let (sender, receiver) = mpsc::unbounded_channel();
        let key_sender = sender.clone();

        tokio::task::spawn_blocking(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or_else(|| Duration::from_secs(0));

                if let Ok(has_event) = event::poll(timeout) {
                    if has_event {
                        if let Ok(Event::Key(key)) = event::read() {
                            if key.kind == event::KeyEventKind::Press
                                && key_sender.send(AppEvent::Key(key)).is_err()
                            {
                                break;
                            }
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if key_sender.send(AppEvent::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { sender, receiver }
    }

    /// Sender handle for background tasks to report API outcomes.
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }
}
