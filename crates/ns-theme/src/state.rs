//! Observable theme state.
//!
//! `ThemeState` is the single owner of "which theme is active". Components
//! that paint anything register a handler with [`ThemeState::subscribe`] and
//! get called with the new [`Theme`] whenever [`ThemeState::set_theme`]
//! actually changes it. Nothing is global: the state is passed to whoever
//! needs to subscribe, which keeps the dependency visible and testable.
//!
//! Handlers run synchronously on the caller's thread, in subscription order.

use std::fmt;

use tracing::debug;

use crate::builtin::builtin_theme;
use crate::theme::{Theme, ThemeName, UnknownTheme};

/// Handle returned by [`ThemeState::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Theme)>;

/// The active theme plus its subscribers.
pub struct ThemeState {
    current: Theme,
    subscribers: Vec<(SubscriptionId, Handler)>,
    next_id: u64,
}

impl ThemeState {
    /// Create the state with `name` active and no subscribers.
    #[must_use]
    pub const fn new(name: ThemeName) -> Self {
        Self {
            current: builtin_theme(name),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// The active theme.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> &Theme {
        &self.current
    }

    /// Name of the active theme.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> ThemeName {
        self.current.name
    }

    /// Register a handler for theme changes.
    ///
    /// The handler is not called for the current theme; read
    /// [`current`](Self::current) for the initial value.
    pub fn subscribe(&mut self, handler: impl FnMut(&Theme) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Switch to `name` and notify subscribers.
    ///
    /// Setting the theme that is already active is a no-op: nobody is
    /// notified. Returns whether the theme changed.
    pub fn set(&mut self, name: ThemeName) -> bool {
        if name == self.current.name {
            return false;
        }
        self.current = builtin_theme(name);
        debug!(theme = %name, subscribers = self.subscribers.len(), "theme changed");
        for (_, handler) in &mut self.subscribers {
            handler(&self.current);
        }
        true
    }

    /// Switch to the theme called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTheme`] (and notifies nobody) if the name is not a
    /// builtin theme.
    pub fn set_theme(&mut self, name: &str) -> Result<bool, UnknownTheme> {
        let parsed: ThemeName = name.parse()?;
        Ok(self.set(parsed))
    }

    /// Advance to the next theme in cycling order and return its name.
    pub fn cycle(&mut self) -> ThemeName {
        let next = self.current.name.next();
        self.set(next);
        next
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(ThemeName::default())
    }
}

impl fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("current", &self.current.name)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(state: &mut ThemeState) -> (SubscriptionId, Rc<RefCell<Vec<ThemeName>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |theme| sink.borrow_mut().push(theme.name));
        (id, seen)
    }

    #[test]
    fn starts_with_requested_theme() {
        let state = ThemeState::new(ThemeName::Monokai);
        assert_eq!(state.name(), ThemeName::Monokai);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn set_theme_notifies_each_subscriber_once() {
        let mut state = ThemeState::new(ThemeName::Light);
        let (_, a) = recorder(&mut state);
        let (_, b) = recorder(&mut state);

        assert_eq!(state.set_theme("dark"), Ok(true));

        assert_eq!(*a.borrow(), vec![ThemeName::Dark]);
        assert_eq!(*b.borrow(), vec![ThemeName::Dark]);
        assert_eq!(state.current().name, ThemeName::Dark);
    }

    #[test]
    fn same_theme_does_not_notify() {
        let mut state = ThemeState::new(ThemeName::Dark);
        let (_, seen) = recorder(&mut state);
        assert_eq!(state.set_theme("dark"), Ok(false));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unknown_theme_is_rejected_without_notification() {
        let mut state = ThemeState::new(ThemeName::Light);
        let (_, seen) = recorder(&mut state);
        assert!(state.set_theme("solarized").is_err());
        assert!(seen.borrow().is_empty());
        assert_eq!(state.name(), ThemeName::Light);
    }

    #[test]
    fn unsubscribed_handler_is_not_called() {
        let mut state = ThemeState::new(ThemeName::Light);
        let (id, seen) = recorder(&mut state);
        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.set(ThemeName::Monokai);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn cycle_visits_every_theme() {
        let mut state = ThemeState::new(ThemeName::Light);
        let (_, seen) = recorder(&mut state);
        assert_eq!(state.cycle(), ThemeName::Dark);
        assert_eq!(state.cycle(), ThemeName::Monokai);
        assert_eq!(state.cycle(), ThemeName::Light);
        assert_eq!(
            *seen.borrow(),
            vec![ThemeName::Dark, ThemeName::Monokai, ThemeName::Light]
        );
    }
}
