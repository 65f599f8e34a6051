//! Startup-time mode resolution.

use tracing::info;

use crate::config::{Configuration, Mode};

/// Decides, once, which strategy the gateway serves.
///
/// The resolver copies the mode out of the configuration at construction
/// and has no setter. Bootstrapping builds one resolver, picks a handler
/// from it, and hands that handler to the gateway; nothing consults the
/// mode again afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeResolver {
    mode: Mode,
}

impl ModeResolver {
    pub fn new(config: &Configuration) -> Self {
        info!(mode = ?config.mode, "gateway mode resolved");
        Self { mode: config.mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_demo(&self) -> bool {
        self.mode == Mode::Demo
    }
}
