//! Light/dark theme preference with an explicit subscription contract.
//!
//! The store starts from the saved preference, or the system theme when none
//! was saved, and keeps following the system until the user picks a theme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage key for the saved preference.
pub const THEME_STORAGE_KEY: &str = "tg_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// Where an explicit theme choice is kept.
pub trait ThemePreferences {
    /// The saved choice, if any. Unrecognized stored values read as `None`.
    fn load(&self) -> Option<Theme>;

    /// Persist a choice. Implementations log failures rather than return them.
    fn save(&self, theme: Theme);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Theme)>;

pub struct ThemeStore<P: ThemePreferences> {
    prefs: P,
    current: Theme,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl<P: ThemePreferences> ThemeStore<P> {
    #[must_use]
    pub fn init(prefs: P, system_theme: Theme) -> Self {
        let current = prefs.load().unwrap_or(system_theme);
        log::debug!("theme initialised to {current}");
        Self {
            prefs,
            current,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub const fn current(&self) -> Theme {
        self.current
    }

    /// True until the user saves an explicit choice.
    #[must_use]
    pub fn follows_system(&self) -> bool {
        self.prefs.load().is_none()
    }

    /// Explicit user choice: persisted, then broadcast if it changed.
    pub fn set(&mut self, theme: Theme) {
        self.prefs.save(theme);
        self.apply(theme);
    }

    /// Register `listener`. It is called once right away with the current theme.
    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(Theme) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        listener(self.current);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// The operating system switched theme. Ignored once the user has chosen.
    pub fn on_system_change(&mut self, theme: Theme) {
        if self.prefs.load().is_some() {
            log::trace!("ignoring system theme {theme}; explicit preference saved");
            return;
        }
        self.apply(theme);
    }

    fn apply(&mut self, theme: Theme) {
        if self.current == theme {
            return;
        }
        self.current = theme;
        for (_, listener) in &mut self.listeners {
            listener(theme);
        }
    }
}
