use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{backend::CrosstermBackend, Terminal};
use telcome_api::{CannedReply, NetworkInfo, TelcomeClient, Ticket};
use telcome_session::{FileStorage, Role, SessionStore, User};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tui_input::backend::crossterm::EventHandler as InputBackend;
use tui_input::Input;

use crate::chat::ChatWidget;
use crate::events::{ApiOutcome, AppEvent, EventHandler};
use crate::forms::{SignInForm, SignUpForm};
use crate::state::{AppState, DashboardTab, Screen};
use crate::ui;

/// What the inline dashboard editor is composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draft {
    /// Description for a new support ticket.
    NewTicket,
    /// Canned reply for the selected unanswered bot message.
    CannedReply,
}

impl Draft {
    pub fn title(&self) -> &'static str {
        match self {
            Draft::NewTicket => "New ticket",
            Draft::CannedReply => "Reply",
        }
    }
}

/// Main TUI application struct
pub struct App {
    pub state: AppState,
    pub session: SessionStore<FileStorage>,
    pub client: TelcomeClient,
    pub signin: SignInForm,
    pub signup: SignUpForm,
    /// The chat overlay; `None` while closed. Every open starts a fresh
    /// conversation.
    pub chat: Option<ChatWidget>,
    /// Stamp for in-flight bot calls; bumped on open/close so replies to a
    /// discarded conversation are dropped.
    chat_generation: u64,
    /// Inline editor over the dashboard, when one is open.
    pub draft: Option<Draft>,
    pub draft_input: Input,
    sender: mpsc::UnboundedSender<AppEvent>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: SessionStore<FileStorage>,
        client: TelcomeClient,
        page_size: usize,
        sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            state: AppState::new(page_size),
            session,
            client,
            signin: SignInForm::new(),
            signup: SignUpForm::new(),
            chat: None,
            chat_generation: 0,
            draft: None,
            draft_input: Input::default(),
            sender,
            should_quit: false,
        }
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        event_handler: &mut EventHandler,
    ) -> Result<()> {
        // A restored session skips the sign-in screen.
        if let Some(user) = self.session.read().user() {
            if let Some(token) = self.session.read().token() {
                self.client.set_access_token(token);
            }
            debug!("restored session for {}", user.username);
            self.state.intent = Screen::Dashboard;
            self.refresh_current_tab();
        }

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            if let Some(event) = event_handler.next().await {
                self.handle_event(event).await;
            } else {
                break;
            }
        }
        Ok(())
    }

    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key).await,
            AppEvent::Api {
                generation,
                outcome,
            } => self.handle_api(generation, outcome).await,
            AppEvent::Tick => {}
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        // The reachable screen is re-derived from the session every time.
        match self.state.screen(&self.session.read()) {
            Screen::SignIn => self.handle_sign_in_key(key),
            Screen::SignUp => self.handle_sign_up_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key).await,
        }
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.signin.next_field(),
            KeyCode::F(2) => {
                self.state.intent = Screen::SignUp;
                self.state.error_message = None;
            }
            KeyCode::Enter => self.submit_sign_in(),
            _ => {
                self.signin
                    .focused_mut()
                    .handle_event(&crossterm::event::Event::Key(key));
            }
        }
    }

    fn handle_sign_up_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.intent = Screen::SignIn;
                self.state.error_message = None;
            }
            KeyCode::Tab => self.signup.next_field(),
            KeyCode::Enter => self.submit_sign_up(),
            _ => {
                self.signup
                    .focused_mut()
                    .handle_event(&crossterm::event::Event::Key(key));
            }
        }
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        if self.chat.is_some() {
            self.handle_chat_key(key);
            return;
        }
        if self.draft.is_some() {
            self.handle_draft_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('l') => self.sign_out().await,
            KeyCode::Char('c') => self.open_chat(),
            KeyCode::Char('r') => self.refresh_current_tab(),
            KeyCode::Char('1') => self.switch_tab(DashboardTab::Tickets),
            KeyCode::Char('2') => self.switch_tab(DashboardTab::Users),
            KeyCode::Char('3') => self.switch_tab(DashboardTab::Bills),
            KeyCode::Char('4') => self.switch_tab(DashboardTab::BotReview),
            KeyCode::Char('n') => self.state.next_page(),
            KeyCode::Char('p') => self.state.prev_page(),
            KeyCode::Down => self.state.select_next_row(),
            KeyCode::Up => self.state.select_prev_row(),
            KeyCode::Char('o') if self.state.tab == DashboardTab::Tickets => {
                self.open_draft(Draft::NewTicket);
            }
            KeyCode::Char('a') if self.state.tab == DashboardTab::BotReview => {
                if self.state.selected_index().is_some() {
                    self.open_draft(Draft::CannedReply);
                }
            }
            KeyCode::Char('x') if self.state.tab == DashboardTab::Tickets => {
                self.close_selected_ticket();
            }
            KeyCode::Char('m') if self.state.tab == DashboardTab::Bills => {
                self.mark_selected_bill_paid();
            }
            KeyCode::Char('g') if self.state.tab == DashboardTab::Users => {
                self.toggle_selected_user_role();
            }
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_chat(),
            KeyCode::Enter => self.send_chat_message(),
            _ => {
                if let Some(chat) = self.chat.as_mut() {
                    chat.input.handle_event(&crossterm::event::Event::Key(key));
                }
            }
        }
    }

    fn open_draft(&mut self, draft: Draft) {
        self.draft = Some(draft);
        self.draft_input.reset();
    }

    fn handle_draft_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.draft = None;
                self.draft_input.reset();
            }
            KeyCode::Enter => self.submit_draft(),
            _ => {
                self.draft_input
                    .handle_event(&crossterm::event::Event::Key(key));
            }
        }
    }

    fn submit_draft(&mut self) {
        let Some(draft) = self.draft else {
            return;
        };
        let text = self.draft_input.value().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.draft = None;
        self.draft_input.reset();
        match draft {
            Draft::NewTicket => self.create_ticket(text),
            Draft::CannedReply => self.save_canned_reply(text),
        }
    }

    // ---- sign-in / sign-up ----------------------------------------------

    fn submit_sign_in(&mut self) {
        self.state.error_message = None;
        if let Err(message) = self.signin.validate() {
            self.state.error_message = Some(message);
            return;
        }
        self.state.is_loading = true;

        let client = self.client.clone();
        let email = self.signin.email.value().to_string();
        let password = self.signin.password.value().to_string();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.login(&email, &password).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::Auth(result),
            });
        });
    }

    fn submit_sign_up(&mut self) {
        self.state.error_message = None;
        if let Err(message) = self.signup.validate() {
            self.state.error_message = Some(message);
            return;
        }
        self.state.is_loading = true;

        let client = self.client.clone();
        let registration = telcome_api::Registration {
            username: self.signup.username.value().trim().to_string(),
            email: self.signup.email.value().trim().to_string(),
            password: self.signup.password.value().to_string(),
            role: self.signup.role,
        };
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.register(&registration).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::Registered(result),
            });
        });
    }

    async fn sign_out(&mut self) {
        if let Err(e) = self.session.sign_out().await {
            // Memory is reset regardless; only the disk cleanup failed.
            warn!("could not clear persisted session: {}", e);
        }
        self.client.clear_access_token();
        self.close_chat();
        self.draft = None;
        self.signin = SignInForm::new();
        self.state.intent = Screen::SignIn;
        self.state.bump_generation();
    }

    // ---- dashboard data -------------------------------------------------

    fn switch_tab(&mut self, tab: DashboardTab) {
        if tab.admin_only() && !self.is_admin() {
            self.state.error_message = Some("Only administrators can open that tab.".to_string());
            return;
        }
        self.state.switch_tab(tab);
        self.refresh_current_tab();
    }

    fn is_admin(&self) -> bool {
        self.session
            .read()
            .role()
            .is_some_and(|role| role.is_admin())
    }

    fn refresh_current_tab(&mut self) {
        let Some(user) = self.session.read().user().cloned() else {
            return;
        };
        self.state.is_loading = true;

        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        let tab = self.state.tab;
        tokio::spawn(async move {
            let outcome = match tab {
                DashboardTab::Tickets => ApiOutcome::Tickets(client.list_tickets(&user).await),
                DashboardTab::Users => ApiOutcome::Users(client.list_users().await),
                DashboardTab::Bills => ApiOutcome::Bills(client.list_bills(&user).await),
                DashboardTab::BotReview => {
                    ApiOutcome::UnknownMessages(client.bot_unknown_messages().await)
                }
            };
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome,
            });
        });
    }

    // ---- dashboard mutations --------------------------------------------

    fn create_ticket(&mut self, description: String) {
        let Some(user) = self.session.read().user().cloned() else {
            return;
        };
        let ticket = Ticket {
            id: None,
            ticket_id: None,
            user: user.id,
            description,
            status: "open".to_string(),
        };
        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.create_ticket(&ticket).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::TicketSaved(result),
            });
        });
    }

    fn close_selected_ticket(&mut self) {
        let Some(index) = self.state.selected_index() else {
            return;
        };
        let mut ticket = self.state.tickets[index].clone();
        let Some(id) = ticket.id.clone() else {
            return;
        };
        ticket.status = "closed".to_string();

        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.update_ticket(&id, &ticket).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::TicketSaved(result),
            });
        });
    }

    fn mark_selected_bill_paid(&mut self) {
        if !self.is_admin() {
            self.state.error_message = Some("Only administrators can edit bills.".to_string());
            return;
        }
        let Some(index) = self.state.selected_index() else {
            return;
        };
        let mut bill = self.state.bills[index].clone();
        let Some(id) = bill.id.clone() else {
            return;
        };
        bill.status = "paid".to_string();

        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.update_bill(&id, &bill).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::BillSaved(result),
            });
        });
    }

    fn toggle_selected_user_role(&mut self) {
        let Some(index) = self.state.selected_index() else {
            return;
        };
        let mut user = self.state.users[index].clone();
        user.role = if user.role.is_admin() {
            Role::Client
        } else {
            Role::Admin
        };

        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let result = client.update_user(&user.id, &user).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::Mutated(result),
            });
        });
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.state.selected_index() else {
            return;
        };
        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();

        match self.state.tab {
            DashboardTab::Tickets => {
                // Deletion keys on the public ticket id.
                let Some(ticket_id) = self.state.tickets[index].ticket_id.clone() else {
                    return;
                };
                tokio::spawn(async move {
                    let result = client.delete_ticket(&ticket_id).await;
                    let _ = sender.send(AppEvent::Api {
                        generation,
                        outcome: ApiOutcome::Mutated(result),
                    });
                });
            }
            DashboardTab::Bills => {
                if !self.is_admin() {
                    self.state.error_message =
                        Some("Only administrators can edit bills.".to_string());
                    return;
                }
                let Some(id) = self.state.bills[index].id.clone() else {
                    return;
                };
                tokio::spawn(async move {
                    let result = client.delete_bill(&id).await;
                    let _ = sender.send(AppEvent::Api {
                        generation,
                        outcome: ApiOutcome::Mutated(result),
                    });
                });
            }
            DashboardTab::Users => {
                let id = self.state.users[index].id.clone();
                tokio::spawn(async move {
                    let result = client.delete_user(&id).await;
                    let _ = sender.send(AppEvent::Api {
                        generation,
                        outcome: ApiOutcome::Mutated(result),
                    });
                });
            }
            DashboardTab::BotReview => {}
        }
    }

    fn save_canned_reply(&mut self, reply_text: String) {
        let Some(index) = self.state.selected_index() else {
            return;
        };
        let message = self.state.unknown_messages[index].message.clone();

        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.state.generation();
        tokio::spawn(async move {
            let reply = CannedReply {
                message,
                response: reply_text,
            };
            let result = client.bot_add_reply(&reply).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::ReplySaved(result),
            });
        });
    }

    // ---- chat -----------------------------------------------------------

    fn open_chat(&mut self) {
        let session = self.session.read();
        let username = session.user().map(|u| u.username.as_str());
        self.chat = Some(ChatWidget::new(username));
        self.chat_generation += 1;
    }

    fn close_chat(&mut self) {
        self.chat = None;
        self.chat_generation += 1;
    }

    fn send_chat_message(&mut self) {
        let Some(chat) = self.chat.as_mut() else {
            return;
        };
        let Some(text) = chat.take_input() else {
            return;
        };
        chat.push_user(text.clone());

        let user_id = self
            .session
            .read()
            .user()
            .map(|u| u.id.clone())
            .unwrap_or_default();
        let client = self.client.clone();
        let sender = self.sender.clone();
        let generation = self.chat_generation;
        tokio::spawn(async move {
            let result = client.bot_message(&text, &user_id).await;
            let _ = sender.send(AppEvent::Api {
                generation,
                outcome: ApiOutcome::Bot {
                    input: text,
                    result,
                },
            });
        });
    }

    // ---- API outcomes ---------------------------------------------------

    pub async fn handle_api(&mut self, generation: u64, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Auth(result) => {
                self.state.is_loading = false;
                match result {
                    Ok(auth) => self.complete_sign_in(auth.user, auth.token).await,
                    Err(e) => self.state.error_message = Some(e.user_message()),
                }
            }
            ApiOutcome::Registered(result) => {
                self.state.is_loading = false;
                match result {
                    Ok(()) => {
                        self.state.intent = Screen::SignIn;
                        self.state.notice =
                            Some("Account created. Please sign in.".to_string());
                        self.signup = SignUpForm::new();
                    }
                    Err(e) => self.state.error_message = Some(e.user_message()),
                }
            }
            ApiOutcome::Bot { input, result } => {
                if generation != self.chat_generation {
                    debug!("dropping bot reply for a closed conversation");
                    return;
                }
                let Some(chat) = self.chat.as_mut() else {
                    return;
                };
                match result {
                    Ok(reply) => chat.push_bot(reply),
                    Err(e) => {
                        debug!("remote bot unavailable, answering locally: {}", e);
                        chat.fallback_reply(&input);
                    }
                }
            }
            ApiOutcome::Tickets(result) => {
                self.apply_list(generation, result, |state, tickets| state.tickets = tickets)
            }
            ApiOutcome::Users(result) => {
                self.apply_list(generation, result, |state, users| state.users = users)
            }
            ApiOutcome::Bills(result) => {
                self.apply_list(generation, result, |state, bills| state.bills = bills)
            }
            ApiOutcome::UnknownMessages(result) => self.apply_list(
                generation,
                result,
                |state, messages| state.unknown_messages = messages,
            ),
            ApiOutcome::TicketSaved(result) => {
                self.apply_mutation(generation, result.map(|_| ()))
            }
            ApiOutcome::BillSaved(result) => self.apply_mutation(generation, result.map(|_| ())),
            ApiOutcome::ReplySaved(result) | ApiOutcome::Mutated(result) => {
                self.apply_mutation(generation, result)
            }
        }
    }

    async fn complete_sign_in(&mut self, user: User, token: String) {
        if let Err(e) = self.session.sign_in(user.clone(), token.clone()).await {
            self.state.error_message = Some(format!("Could not save your session: {e}"));
            return;
        }
        self.client.set_access_token(token);
        self.state.error_message = None;
        self.state.notice = None;
        self.state.intent = Screen::Dashboard;
        self.state.switch_tab(DashboardTab::Tickets);
        self.refresh_current_tab();
        self.report_network_info(&user.id);
    }

    /// Connection telemetry recorded at sign-in; failures are ignorable.
    fn report_network_info(&self, user_id: &str) {
        let client = self.client.clone();
        let info = NetworkInfo {
            user_id: user_id.to_string(),
            network: None,
        };
        tokio::spawn(async move {
            if let Err(e) = client.report_network_info(&info).await {
                debug!("network info report failed: {}", e);
            }
        });
    }

    fn apply_list<T>(
        &mut self,
        generation: u64,
        result: Result<T, telcome_api::ApiError>,
        apply: impl FnOnce(&mut AppState, T),
    ) {
        if !self.state.accepts(generation) {
            debug!("dropping stale response for a previous view");
            return;
        }
        self.state.is_loading = false;
        match result {
            Ok(items) => apply(&mut self.state, items),
            Err(e) => self.state.error_message = Some(e.user_message()),
        }
    }

    /// A write finished: refetch the list it touched, unless the view has
    /// moved on since the request was spawned.
    fn apply_mutation(&mut self, generation: u64, result: Result<(), telcome_api::ApiError>) {
        if !self.state.accepts(generation) {
            debug!("dropping stale mutation result for a previous view");
            return;
        }
        match result {
            Ok(()) => self.refresh_current_tab(),
            Err(e) => self.state.error_message = Some(e.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use telcome_api::ApiError;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::new(FileStorage::with_dir(dir.path()));
        let client = TelcomeClient::new("http://127.0.0.1:9").unwrap();
        let (sender, _receiver) = mpsc::unbounded_channel();
        (App::new(session, client, 10, sender), dir)
    }

    async fn signed_in_app(role: Role) -> (App, tempfile::TempDir) {
        let (mut app, dir) = test_app();
        app.session.sign_in(sample_user(role), "t").await.unwrap();
        app.state.intent = Screen::Dashboard;
        (app, dir)
    }

    fn sample_user(role: Role) -> User {
        User {
            id: "1".to_string(),
            username: "a".to_string(),
            email: "a@b.c".to_string(),
            role,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_sign_in_outcome_reaches_the_dashboard() {
        let (mut app, _dir) = test_app();
        app.handle_api(
            0,
            ApiOutcome::Auth(Ok(telcome_api::AuthResponse {
                user: sample_user(Role::Client),
                token: "t".to_string(),
            })),
        )
        .await;

        assert_eq!(app.state.screen(&app.session.read()), Screen::Dashboard);
        assert_eq!(app.session.read().token(), Some("t"));
    }

    #[tokio::test]
    async fn test_failed_sign_in_shows_the_server_message() {
        let (mut app, _dir) = test_app();
        app.handle_api(
            0,
            ApiOutcome::Auth(Err(ApiError::auth("Invalid credentials"))),
        )
        .await;

        assert_eq!(
            app.state.error_message.as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(app.state.screen(&app.session.read()), Screen::SignIn);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_the_dashboard() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;

        app.sign_out().await;
        assert_eq!(app.state.screen(&app.session.read()), Screen::SignIn);
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_client_role_cannot_open_admin_tabs() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;

        app.switch_tab(DashboardTab::Users);
        assert_eq!(app.state.tab, DashboardTab::Tickets);
        assert!(app.state.error_message.is_some());

        app.state.error_message = None;
        app.switch_tab(DashboardTab::Bills);
        assert_eq!(app.state.tab, DashboardTab::Bills);
        assert!(app.state.error_message.is_none());
    }

    #[tokio::test]
    async fn test_stale_list_response_is_dropped() {
        let (mut app, _dir) = test_app();
        let old_generation = app.state.generation();
        app.state.switch_tab(DashboardTab::Bills);

        app.handle_api(
            old_generation,
            ApiOutcome::Tickets(Ok(vec![Ticket {
                id: None,
                ticket_id: None,
                user: "1".to_string(),
                description: "late".to_string(),
                status: "open".to_string(),
            }])),
        )
        .await;
        assert!(app.state.tickets.is_empty());
    }

    #[tokio::test]
    async fn test_new_ticket_draft_opens_and_submits() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;

        app.handle_key(key(KeyCode::Char('o'))).await;
        assert_eq!(app.draft, Some(Draft::NewTicket));

        app.draft_input = Input::new("router is down".to_string());
        app.handle_key(key(KeyCode::Enter)).await;
        assert_eq!(app.draft, None);
        assert_eq!(app.draft_input.value(), "");
    }

    #[tokio::test]
    async fn test_empty_ticket_draft_is_not_submitted() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;

        app.handle_key(key(KeyCode::Char('o'))).await;
        app.handle_key(key(KeyCode::Enter)).await;
        // Still composing: an empty description is never sent.
        assert_eq!(app.draft, Some(Draft::NewTicket));

        app.handle_key(key(KeyCode::Esc)).await;
        assert_eq!(app.draft, None);
    }

    #[tokio::test]
    async fn test_ticket_draft_key_only_works_on_the_tickets_tab() {
        let (mut app, _dir) = signed_in_app(Role::Admin).await;
        app.switch_tab(DashboardTab::Bills);

        app.handle_key(key(KeyCode::Char('o'))).await;
        assert_eq!(app.draft, None);
    }

    #[tokio::test]
    async fn test_bill_mutations_are_admin_only() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;
        app.switch_tab(DashboardTab::Bills);
        app.state.bills = vec![telcome_api::Bill {
            id: Some("b1".to_string()),
            user_id: "1".to_string(),
            billing_address: "12 Elm".to_string(),
            description: "fibre".to_string(),
            amount: "42".to_string(),
            status: "unpaid".to_string(),
        }];

        app.handle_key(key(KeyCode::Char('d'))).await;
        assert!(app.state.error_message.is_some());

        app.state.error_message = None;
        app.handle_key(key(KeyCode::Char('m'))).await;
        assert!(app.state.error_message.is_some());
    }

    #[tokio::test]
    async fn test_ticket_delete_needs_a_public_id() {
        let (mut app, _dir) = signed_in_app(Role::Client).await;
        app.state.tickets = vec![Ticket {
            id: Some("abc".to_string()),
            ticket_id: None,
            user: "1".to_string(),
            description: "d".to_string(),
            status: "open".to_string(),
        }];

        // No ticketId to key the delete on: the press is a no-op.
        app.handle_key(key(KeyCode::Char('d'))).await;
        assert!(app.state.error_message.is_none());
        assert_eq!(app.state.tickets.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_shows_the_server_message() {
        let (mut app, _dir) = signed_in_app(Role::Admin).await;
        let generation = app.state.generation();

        app.handle_api(
            generation,
            ApiOutcome::Mutated(Err(ApiError::Status {
                status: 500,
                message: "boom".to_string(),
            })),
        )
        .await;
        assert_eq!(app.state.error_message.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_stale_mutation_result_is_dropped() {
        let (mut app, _dir) = signed_in_app(Role::Admin).await;
        let old_generation = app.state.generation();
        app.state.switch_tab(DashboardTab::Users);

        app.handle_api(old_generation, ApiOutcome::Mutated(Err(ApiError::auth("late"))))
            .await;
        assert!(app.state.error_message.is_none());
    }

    #[tokio::test]
    async fn test_bot_transport_failure_falls_back_to_eliza() {
        let (mut app, _dir) = test_app();
        app.open_chat();
        let generation = app.chat_generation;
        app.chat
            .as_mut()
            .unwrap()
            .push_user("I need help with my bill");

        app.handle_api(
            generation,
            ApiOutcome::Bot {
                input: "I need help with my bill".to_string(),
                result: Err(ApiError::Network("connection refused".to_string())),
            },
        )
        .await;

        let chat = app.chat.as_ref().unwrap();
        let last = chat.messages.last().unwrap();
        assert_eq!(last.sender, crate::chat::ChatSender::Bot);
        assert!(!last.text.is_empty());
        assert!(!last.text.to_lowercase().contains("error"));
    }

    #[tokio::test]
    async fn test_bot_reply_for_closed_chat_is_dropped() {
        let (mut app, _dir) = test_app();
        app.open_chat();
        let generation = app.chat_generation;
        app.close_chat();
        app.open_chat();
        let before = app.chat.as_ref().unwrap().messages.len();

        app.handle_api(
            generation,
            ApiOutcome::Bot {
                input: "hello".to_string(),
                result: Ok("late reply".to_string()),
            },
        )
        .await;
        assert_eq!(app.chat.as_ref().unwrap().messages.len(), before);
    }
}
