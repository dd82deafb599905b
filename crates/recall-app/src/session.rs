//! Interactive session loop.
//!
//! Reads one utterance per line from stdin and runs it through the
//! dispatcher, while a ticker expires overlay layers. Lines starting with
//! `:` drive the simulated desktop instead of being spoken.

use std::io::Write;
use std::time::{Duration, Instant};

use recall_action::overlay::OverlaySurface;
use recall_action::{Dispatcher, Outcome};
use recall_core::desktop::SimulatedDesktop;
use recall_core::host::WindowSystem;
use recall_core::types::{Rect, WindowId, WindowInfo};
use tokio::io::{AsyncBufReadExt, BufReader};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// A `:`-prefixed desktop control line.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Focus(WindowId),
    Close(WindowId),
    Open { id: WindowId, app: String, title: String },
    Windows,
    Quit,
}

impl Control {
    /// Parse a control line. Returns an error message for unknown or
    /// malformed controls.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.trim_start_matches(':').split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let mut id = || -> Result<WindowId, String> {
            parts
                .next()
                .and_then(|s| s.parse().ok())
                .map(WindowId)
                .ok_or_else(|| format!(":{} needs a numeric window id", verb))
        };
        match verb {
            "focus" => Ok(Control::Focus(id()?)),
            "close" => Ok(Control::Close(id()?)),
            "open" => {
                let id = id()?;
                let app = parts
                    .next()
                    .ok_or_else(|| ":open needs an app name".to_string())?
                    .to_string();
                let title = parts.collect::<Vec<_>>().join(" ");
                Ok(Control::Open { id, app, title })
            }
            "windows" => Ok(Control::Windows),
            "quit" | "q" => Ok(Control::Quit),
            other => Err(format!("unknown control :{}", other)),
        }
    }
}

/// Run the read-dispatch loop until stdin closes or `:quit`.
pub async fn run<S: OverlaySurface>(
    mut dispatcher: Dispatcher<SimulatedDesktop, S>,
    json: bool,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    let mut out = std::io::stdout();

    tracing::info!("Session started; one utterance per line, :quit to exit");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed");
                    break;
                };
                if !handle_line(&mut dispatcher, &line, json, &mut out)? {
                    break;
                }
            }
            _ = ticker.tick() => dispatcher.tick(Instant::now()),
        }
    }
    Ok(())
}

/// Handle one input line. Returns `false` when the session should end.
pub fn handle_line<S: OverlaySurface, W: Write>(
    dispatcher: &mut Dispatcher<SimulatedDesktop, S>,
    line: &str,
    json: bool,
    out: &mut W,
) -> std::io::Result<bool> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(true);
    }

    if line.starts_with(':') {
        return match Control::parse(line) {
            Ok(control) => apply_control(dispatcher, control, out),
            Err(message) => {
                writeln!(out, "{}", message)?;
                Ok(true)
            }
        };
    }

    match dispatcher.handle_utterance(line) {
        Some(outcome) => print_outcome(&outcome, json, out)?,
        None if json => writeln!(out, "null")?,
        None => writeln!(out, "(no match)")?,
    }
    Ok(true)
}

fn apply_control<S: OverlaySurface, W: Write>(
    dispatcher: &mut Dispatcher<SimulatedDesktop, S>,
    control: Control,
    out: &mut W,
) -> std::io::Result<bool> {
    match control {
        Control::Focus(id) => {
            if !dispatcher.host_mut().set_active(id) {
                writeln!(out, "no window {}", id)?;
            }
        }
        Control::Close(id) => {
            if dispatcher.host_mut().close(id) {
                let removed = dispatcher.window_closed(id);
                if !removed.is_empty() {
                    writeln!(out, "forgot {}", removed.join(", "))?;
                }
            } else {
                writeln!(out, "no window {}", id)?;
            }
        }
        Control::Open { id, app, title } => {
            let window = WindowInfo::new(id.0, &app, &title, Rect::new(0.0, 0.0, 800.0, 600.0));
            dispatcher.host_mut().open(window);
        }
        Control::Windows => {
            let active = dispatcher.host().active_id();
            for w in dispatcher.host().windows() {
                let marker = if Some(w.id) == active { '*' } else { ' ' };
                writeln!(out, "{} {:>4}  {:<16} {}", marker, w.id.0, w.app.0, w.title)?;
            }
        }
        Control::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_outcome<W: Write>(outcome: &Outcome, json: bool, out: &mut W) -> std::io::Result<()> {
    if json {
        let line = serde_json::to_string(outcome)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        return writeln!(out, "{}", line);
    }
    let status = if outcome.success { "ok" } else { "failed" };
    match &outcome.message {
        Some(message) => writeln!(out, "{}: {} ({})", outcome.action, status, message),
        None => writeln!(out, "{}: {}", outcome.action, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_action::overlay::NullSurface;
    use recall_core::config::RecallConfig;
    use recall_registry::LabelRegistry;

    fn dispatcher() -> Dispatcher<SimulatedDesktop, NullSurface> {
        let mut config = RecallConfig::default();
        config.dictation.focus_timeout_millis = 0;
        config.dictation.key_delay_millis = 0;
        let mut desktop = SimulatedDesktop::new();
        desktop.open(WindowInfo::new(1, "firefox", "Docs", Rect::new(0.0, 0.0, 10.0, 10.0)));
        Dispatcher::new(desktop, NullSurface, LabelRegistry::new(), &config)
    }

    fn run_lines(d: &mut Dispatcher<SimulatedDesktop, NullSurface>, lines: &[&str], json: bool) -> String {
        let mut out = Vec::new();
        for line in lines {
            handle_line(d, line, json, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_controls() {
        assert_eq!(Control::parse(":focus 3"), Ok(Control::Focus(WindowId(3))));
        assert_eq!(Control::parse(":close 12"), Ok(Control::Close(WindowId(12))));
        assert_eq!(
            Control::parse(":open 4 kitty me@box: ~/src"),
            Ok(Control::Open {
                id: WindowId(4),
                app: "kitty".to_string(),
                title: "me@box: ~/src".to_string()
            })
        );
        assert_eq!(Control::parse(":q"), Ok(Control::Quit));
        assert!(Control::parse(":focus x").is_err());
        assert!(Control::parse(":dance").is_err());
    }

    #[test]
    fn test_utterances_print_outcomes() {
        let mut d = dispatcher();
        let out = run_lines(&mut d, &["recall assign docs", "hello there"], false);
        assert_eq!(out, "save_window: ok (saved \"docs\")\n(no match)\n");
    }

    #[test]
    fn test_json_outcomes() {
        let mut d = dispatcher();
        let out = run_lines(&mut d, &["recall forget docs"], true);
        // "docs" is not in the vocabulary, so nothing matches.
        assert_eq!(out, "null\n");

        let out = run_lines(&mut d, &["recall assign docs"], true);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["action"], "save_window");
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_open_focus_close_controls() {
        let mut d = dispatcher();
        run_lines(&mut d, &[":open 2 kitty shell", ":focus 2", "recall assign term"], false);
        assert_eq!(d.registry().resolve("term").unwrap().window, WindowId(2));

        let out = run_lines(&mut d, &[":close 2"], false);
        assert_eq!(out, "forgot term\n");
        assert!(d.registry().is_empty());
    }

    #[test]
    fn test_quit_ends_session() {
        let mut d = dispatcher();
        let mut out = Vec::new();
        assert!(!handle_line(&mut d, ":quit", false, &mut out).unwrap());
        assert!(handle_line(&mut d, "   ", false, &mut out).unwrap());
    }
}
