use std::sync::Arc;

use parley_core::{Assistant, ConversationStore, SessionState, SubmitOutcome};
use tokio::sync::watch;
use tracing::debug;

use super::scroll::ScrollFollow;

const SCROLL_STEP: u16 = 1;
const PAGE_STEP: u16 = 10;

/// Chat surface state: the conversation plus what only the view cares about.
pub struct ChatApp {
    pub store: ConversationStore,
    pub title: String,
    pub should_quit: bool,
    pub scroll: ScrollFollow,
    /// Frames drawn so far, drives the typing animation.
    pub tick: u64,
    updates: watch::Receiver<SessionState>,
    seen_revision: u64,
}

impl ChatApp {
    pub fn new(assistant: Arc<dyn Assistant>, title: impl Into<String>) -> Self {
        let store = ConversationStore::new(assistant);
        let updates = store.subscribe();
        Self {
            store,
            title: title.into(),
            should_quit: false,
            scroll: ScrollFollow::new(),
            tick: 0,
            updates,
            seen_revision: 0,
        }
    }

    /// Mounts the surface: asks for the opening message.
    pub fn start(&mut self) {
        self.store.initialize();
    }

    pub fn send_message(&mut self) {
        let outcome = self.store.submit_pending_input();
        debug!(?outcome, "Send requested");
        if outcome == SubmitOutcome::Sent {
            self.sync_view();
        }
    }

    /// Applies settled calls and keeps the view on the newest entry.
    pub fn poll(&mut self) {
        self.store.poll();
        self.sync_view();
    }

    /// Re-pins the view when the session published a new revision.
    fn sync_view(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let revision = self.updates.borrow_and_update().revision;
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll.scroll_to_bottom();
        }
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll.scroll_up(SCROLL_STEP);
    }

    pub fn scroll_down(&mut self) {
        self.scroll.scroll_down(SCROLL_STEP);
    }

    pub fn page_up(&mut self) {
        self.scroll.scroll_up(PAGE_STEP);
    }

    pub fn page_down(&mut self) {
        self.scroll.scroll_down(PAGE_STEP);
    }

    pub fn input_char(&mut self, c: char) {
        self.store.pending_input_mut().insert_char(c);
    }

    pub fn input_backspace(&mut self) {
        self.store.pending_input_mut().backspace();
    }

    pub fn input_delete(&mut self) {
        self.store.pending_input_mut().delete();
    }

    pub fn input_left(&mut self) {
        self.store.pending_input_mut().move_left();
    }

    pub fn input_right(&mut self) {
        self.store.pending_input_mut().move_right();
    }

    pub fn input_home(&mut self) {
        self.store.pending_input_mut().move_home();
    }

    pub fn input_end(&mut self) {
        self.store.pending_input_mut().move_end();
    }
}
