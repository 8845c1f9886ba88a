//! Light/dark theme preference and change notification
//!
//! The compositor never looks at the theme; only the interface chrome does.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::debug;
use serde::{Deserialize, Serialize};

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn name(&self) -> &'static str {
        match self {
            ThemePreference::Light => "Light",
            ThemePreference::Dark => "Dark",
            ThemePreference::System => "System",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::System,
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::System => ThemePreference::Dark,
        }
    }
}

/// The theme actually in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn is_dark(&self) -> bool {
        matches!(self, ResolvedTheme::Dark)
    }
}

struct Shared {
    preference: ThemePreference,
    system_dark: bool,
    next_id: u64,
    listeners: Vec<(u64, Sender<ResolvedTheme>)>,
}

impl Shared {
    fn resolve(&self) -> ResolvedTheme {
        match self.preference {
            ThemePreference::Light => ResolvedTheme::Light,
            ThemePreference::Dark => ResolvedTheme::Dark,
            ThemePreference::System if self.system_dark => ResolvedTheme::Dark,
            ThemePreference::System => ResolvedTheme::Light,
        }
    }

    /// Apply `change` and tell listeners if the resolved theme moved
    fn update(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.resolve();
        change(self);
        let after = self.resolve();
        if before != after {
            debug!("theme changed to {:?}", after);
            self.listeners.retain(|(_, tx)| tx.send(after).is_ok());
        }
    }
}

/// Owns the theme preference and the last known system preference
#[derive(Clone)]
pub struct ThemeController {
    shared: Arc<Mutex<Shared>>,
}

impl ThemeController {
    pub fn new(preference: ThemePreference, system_dark: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                preference,
                system_dark,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn preference(&self) -> ThemePreference {
        self.lock().preference
    }

    pub fn resolve(&self) -> ResolvedTheme {
        self.lock().resolve()
    }

    pub fn set_preference(&self, preference: ThemePreference) {
        self.lock().update(|shared| shared.preference = preference);
    }

    /// Record a change in the system's light/dark setting
    pub fn set_system_prefers_dark(&self, dark: bool) {
        self.lock().update(|shared| shared.system_dark = dark);
    }

    /// Receive every change of the resolved theme until the subscription
    /// is dropped
    pub fn subscribe(&self) -> ThemeSubscription {
        let (tx, rx) = unbounded();
        let mut shared = self.lock();
        let id = shared.next_id;
        shared.next_id += 1;
        shared.listeners.push((id, tx));

        ThemeSubscription {
            id,
            rx,
            controller: Arc::downgrade(&self.shared),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

/// A registered theme listener. Unregisters itself on drop.
pub struct ThemeSubscription {
    id: u64,
    rx: Receiver<ResolvedTheme>,
    controller: Weak<Mutex<Shared>>,
}

impl ThemeSubscription {
    /// Next pending change, if any
    pub fn try_recv(&self) -> Option<ResolvedTheme> {
        match self.rx.try_recv() {
            Ok(theme) => Some(theme),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Most recent pending change, discarding older ones
    pub fn latest(&self) -> Option<ResolvedTheme> {
        self.rx.try_iter().last()
    }
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        if let Some(shared) = self.controller.upgrade() {
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            shared.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
