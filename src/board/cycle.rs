use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Manual navigation request from the display client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    NextPage,
    PrevPage,
    NextGroup,
    PrevGroup,
}

/// Current display position: which platform group and which of its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Position {
    pub group: usize,
    pub page: usize,
}

/// Display rotation state machine.
///
/// The board is Cycling by default: each automatic tick advances one page,
/// rolling over into the next group and wrapping at the end. Any manual
/// navigation switches to Paused for a fixed window; automatic ticks are
/// no-ops until the window expires, and each manual action re-arms it.
pub struct Cycler {
    group: usize,
    page: usize,
    paused_until: Option<DateTime<Utc>>,
    pause: Duration,
}

impl Cycler {
    pub fn new(pause_secs: u64) -> Self {
        Self {
            group: 0,
            page: 0,
            paused_until: None,
            pause: Duration::seconds(pause_secs as i64),
        }
    }

    pub fn position(&self) -> Position {
        Position {
            group: self.group,
            page: self.page,
        }
    }

    pub fn is_paused(&self, now: DateTime<Utc>) -> bool {
        self.paused_until.is_some_and(|until| now < until)
    }

    /// Re-fit the position to the current board shape. Called after every
    /// data refresh; a vanished group or page snaps back to the start of
    /// the board rather than pointing past the end.
    pub fn clamp(&mut self, group_page_counts: &[usize]) {
        if self.group >= group_page_counts.len() {
            self.group = 0;
            self.page = 0;
            return;
        }
        if self.page >= group_page_counts[self.group] {
            self.page = 0;
        }
    }

    /// One automatic rotation tick. Ignored while a manual pause is
    /// active; an expired pause is cleared and rotation resumes.
    pub fn auto_tick(&mut self, group_page_counts: &[usize], now: DateTime<Utc>) {
        if let Some(until) = self.paused_until {
            if now < until {
                return;
            }
            self.paused_until = None;
        }
        self.clamp(group_page_counts);
        self.step_forward(group_page_counts);
    }

    /// Apply a manual navigation action and (re-)arm the pause window.
    pub fn navigate(&mut self, action: NavAction, group_page_counts: &[usize], now: DateTime<Utc>) {
        self.clamp(group_page_counts);
        match action {
            NavAction::NextPage => self.step_forward(group_page_counts),
            NavAction::PrevPage => self.step_back(group_page_counts),
            NavAction::NextGroup => {
                if !group_page_counts.is_empty() {
                    self.group = (self.group + 1) % group_page_counts.len();
                }
                self.page = 0;
            }
            NavAction::PrevGroup => {
                if !group_page_counts.is_empty() {
                    self.group = self
                        .group
                        .checked_sub(1)
                        .unwrap_or(group_page_counts.len() - 1);
                }
                self.page = 0;
            }
        }
        self.paused_until = Some(now + self.pause);
    }

    fn step_forward(&mut self, group_page_counts: &[usize]) {
        if group_page_counts.is_empty() {
            self.group = 0;
            self.page = 0;
            return;
        }
        if self.page + 1 < group_page_counts[self.group] {
            self.page += 1;
        } else {
            self.group = (self.group + 1) % group_page_counts.len();
            self.page = 0;
        }
    }

    fn step_back(&mut self, group_page_counts: &[usize]) {
        if group_page_counts.is_empty() {
            self.group = 0;
            self.page = 0;
            return;
        }
        if self.page > 0 {
            self.page -= 1;
        } else {
            self.group = self
                .group
                .checked_sub(1)
                .unwrap_or(group_page_counts.len() - 1);
            self.page = group_page_counts[self.group].saturating_sub(1);
        }
    }
}
