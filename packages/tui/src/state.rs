//! Application state shared by the event loop and the renderer.

use telcome_api::{Bill, Ticket, UnknownMessage};
use telcome_session::{Session, User};

/// Top-level screens. Which one actually renders is re-derived from the
/// session on every frame, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    SignUp,
    Dashboard,
}

/// Dashboard tabs. `Users` and `BotReview` are admin-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Tickets,
    Users,
    Bills,
    BotReview,
}

impl DashboardTab {
    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Tickets => "Tickets",
            DashboardTab::Users => "Users",
            DashboardTab::Bills => "Bills",
            DashboardTab::BotReview => "Eliza",
        }
    }

    pub fn admin_only(&self) -> bool {
        matches!(self, DashboardTab::Users | DashboardTab::BotReview)
    }
}

pub struct AppState {
    /// Where the user navigated; the session can overrule it.
    pub intent: Screen,
    pub tab: DashboardTab,
    /// Bumped on every tab or screen change; async results stamped with an
    /// older value are stale and get dropped instead of applied.
    generation: u64,
    pub tickets: Vec<Ticket>,
    pub users: Vec<User>,
    pub bills: Vec<Bill>,
    pub unknown_messages: Vec<UnknownMessage>,
    pub selected_row: usize,
    pub page: usize,
    pub page_size: usize,
    pub error_message: Option<String>,
    /// Informational banner, e.g. after a successful registration.
    pub notice: Option<String>,
    pub is_loading: bool,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            intent: Screen::SignIn,
            tab: DashboardTab::Tickets,
            generation: 0,
            tickets: Vec::new(),
            users: Vec::new(),
            bills: Vec::new(),
            unknown_messages: Vec::new(),
            selected_row: 0,
            page: 0,
            page_size,
            error_message: None,
            notice: None,
            is_loading: false,
        }
    }

    /// The screen to render for this frame. The dashboard is reachable iff
    /// the session holds a user right now; an anonymous session always
    /// lands on sign-in no matter what was navigated to earlier.
    pub fn screen(&self, session: &Session) -> Screen {
        match self.intent {
            Screen::Dashboard if !session.is_authenticated() => Screen::SignIn,
            screen => screen,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate every in-flight fetch and return the stamp for new ones.
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Whether a result stamped with `generation` may still be applied.
    pub fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn switch_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
        self.page = 0;
        self.selected_row = 0;
        self.error_message = None;
        self.bump_generation();
    }

    /// Row count of the currently visible list.
    pub fn current_len(&self) -> usize {
        match self.tab {
            DashboardTab::Tickets => self.tickets.len(),
            DashboardTab::Users => self.users.len(),
            DashboardTab::Bills => self.bills.len(),
            DashboardTab::BotReview => self.unknown_messages.len(),
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.current_len(), self.page_size)
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.total_pages() {
            self.page += 1;
            self.selected_row = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.selected_row = 0;
        }
    }

    pub fn select_next_row(&mut self) {
        let len = page_len(self.current_len(), self.page, self.page_size);
        if len > 0 && self.selected_row + 1 < len {
            self.selected_row += 1;
        }
    }

    pub fn select_prev_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    /// Index into the full list for the selected row on the current page.
    pub fn selected_index(&self) -> Option<usize> {
        let index = self.page * self.page_size + self.selected_row;
        (index < self.current_len()).then_some(index)
    }
}

/// Slice of `items` visible on `page`.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page * page_size;
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

fn page_len(len: usize, page: usize, page_size: usize) -> usize {
    page_slice(&vec![(); len], page, page_size).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use telcome_session::{Role, Session};

    fn signed_in() -> Session {
        Session::authenticated(
            User {
                id: "1".to_string(),
                username: "a".to_string(),
                email: "a@b.c".to_string(),
                role: Role::Client,
            },
            "t",
        )
    }

    #[test]
    fn test_dashboard_requires_a_session() {
        let mut state = AppState::new(10);
        state.intent = Screen::Dashboard;

        assert_eq!(state.screen(&signed_in()), Screen::Dashboard);
        // Session becoming anonymous revokes access on the very next frame.
        assert_eq!(state.screen(&Session::anonymous()), Screen::SignIn);
    }

    #[test]
    fn test_signup_is_reachable_without_a_session() {
        let mut state = AppState::new(10);
        state.intent = Screen::SignUp;
        assert_eq!(state.screen(&Session::anonymous()), Screen::SignUp);
    }

    #[test]
    fn test_stale_generations_are_rejected() {
        let mut state = AppState::new(10);
        let stamp = state.generation();
        assert!(state.accepts(stamp));

        state.switch_tab(DashboardTab::Bills);
        assert!(!state.accepts(stamp));
        assert!(state.accepts(state.generation()));
    }

    #[test]
    fn test_pagination_slicing() {
        let items: Vec<u32> = (0..23).collect();
        assert_eq!(page_slice(&items, 0, 10), (0..10).collect::<Vec<_>>());
        assert_eq!(page_slice(&items, 2, 10), (20..23).collect::<Vec<_>>());
        assert!(page_slice(&items, 3, 10).is_empty());
        assert_eq!(total_pages(23, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_row_selection_stays_in_page() {
        let mut state = AppState::new(2);
        state.tickets = vec![
            Ticket {
                id: None,
                ticket_id: None,
                user: "1".to_string(),
                description: "a".to_string(),
                status: "open".to_string(),
            };
            3
        ];
        state.select_next_row();
        state.select_next_row();
        assert_eq!(state.selected_row, 1);
        state.next_page();
        assert_eq!(state.page, 1);
        assert_eq!(state.selected_index(), Some(2));
    }
}
