//! Dictation routing.
//!
//! Focuses a target window, waits for the focus change to land, then types
//! text into it and optionally presses a trailing key.

use std::time::{Duration, Instant};

use recall_core::config::DictationConfig;
use recall_core::error::Result;
use recall_core::host::{KeyboardInput, WindowSystem};
use recall_core::types::WindowId;
use tracing::{debug, warn};

/// Sends text to a specific window.
#[derive(Debug, Clone)]
pub struct DictationRouter {
    focus_timeout: Duration,
    focus_poll: Duration,
    key_delay: Duration,
}

impl Default for DictationRouter {
    fn default() -> Self {
        Self::new(&DictationConfig::default())
    }
}

impl DictationRouter {
    pub fn new(config: &DictationConfig) -> Self {
        Self {
            focus_timeout: Duration::from_millis(config.focus_timeout_millis),
            focus_poll: Duration::from_millis(config.focus_poll_millis),
            key_delay: Duration::from_millis(config.key_delay_millis),
        }
    }

    /// Focus `target` and wait until the host reports it active.
    ///
    /// A focus change that has not landed within the timeout is logged and
    /// otherwise ignored; the caller proceeds as if it had. Polling blocks
    /// the calling thread.
    pub fn focus<H: WindowSystem + ?Sized>(&self, host: &mut H, target: WindowId) -> Result<()> {
        host.focus(target)?;

        let started = Instant::now();
        loop {
            if host.active_window().map(|w| w.id) == Some(target) {
                debug!(window = %target, "Window focused");
                return Ok(());
            }
            if started.elapsed() >= self.focus_timeout {
                warn!(window = %target, "Timed out waiting for focus change");
                return Ok(());
            }
            std::thread::sleep(self.focus_poll);
        }
    }

    /// Focus `target`, type `text`, and press Enter when `append_enter` is set.
    pub fn dictate<H>(&self, host: &mut H, target: WindowId, text: &str, append_enter: bool) -> Result<()>
    where
        H: WindowSystem + KeyboardInput + ?Sized,
    {
        self.focus(host, target)?;
        if !text.is_empty() {
            host.insert(text)?;
        }
        if append_enter {
            self.pause();
            host.key("enter")?;
        }
        debug!(window = %target, text_len = text.len(), append_enter, "Dictation routed");
        Ok(())
    }

    /// Focus `target` and press a number key.
    pub fn press_number<H>(&self, host: &mut H, target: WindowId, number: u8) -> Result<()>
    where
        H: WindowSystem + KeyboardInput + ?Sized,
    {
        self.focus(host, target)?;
        self.pause();
        host.key(&number.to_string())
    }

    fn pause(&self) {
        if !self.key_delay.is_zero() {
            std::thread::sleep(self.key_delay);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::desktop::{InputEvent, SimulatedDesktop};
    use recall_core::types::{Rect, WindowInfo};

    fn router() -> DictationRouter {
        DictationRouter::new(&DictationConfig {
            focus_timeout_millis: 0,
            focus_poll_millis: 0,
            key_delay_millis: 0,
        })
    }

    fn desktop() -> SimulatedDesktop {
        let mut d = SimulatedDesktop::new();
        d.open(WindowInfo::new(1, "firefox", "Docs", Rect::new(0.0, 0.0, 10.0, 10.0)));
        d.open(WindowInfo::new(2, "kitty", "shell", Rect::new(0.0, 0.0, 10.0, 10.0)));
        d
    }

    #[test]
    fn test_dictate_focuses_then_types() {
        let mut d = desktop();
        router().dictate(&mut d, WindowId(2), "ls -la", false).unwrap();
        assert_eq!(d.active_id(), Some(WindowId(2)));
        assert_eq!(
            d.input(),
            &[InputEvent::Text {
                window: Some(WindowId(2)),
                text: "ls -la".to_string()
            }]
        );
    }

    #[test]
    fn test_dictate_with_enter() {
        let mut d = desktop();
        router().dictate(&mut d, WindowId(2), "make", true).unwrap();
        assert_eq!(d.input().len(), 2);
        assert_eq!(
            d.input()[1],
            InputEvent::Key {
                window: Some(WindowId(2)),
                key: "enter".to_string()
            }
        );
    }

    #[test]
    fn test_dictate_empty_text_only_enter() {
        let mut d = desktop();
        router().dictate(&mut d, WindowId(1), "", true).unwrap();
        assert_eq!(d.input().len(), 1);
    }

    #[test]
    fn test_press_number() {
        let mut d = desktop();
        router().press_number(&mut d, WindowId(1), 3).unwrap();
        assert_eq!(
            d.input(),
            &[InputEvent::Key {
                window: Some(WindowId(1)),
                key: "3".to_string()
            }]
        );
    }

    #[test]
    fn test_focus_missing_window_errors() {
        let mut d = desktop();
        assert!(router().dictate(&mut d, WindowId(9), "x", false).is_err());
        assert!(d.input().is_empty());
    }
}
