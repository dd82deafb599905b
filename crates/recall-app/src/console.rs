//! Overlay surface that prints to a terminal.

use std::io::Write;

use recall_action::overlay::{OverlayLayer, OverlaySurface, OverlayView};
use recall_core::error::Result;

/// Writes each overlay view as a framed text block.
pub struct ConsoleSurface<W> {
    out: W,
}

impl ConsoleSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OverlaySurface for ConsoleSurface<W> {
    fn show(&mut self, view: &OverlayView) -> Result<()> {
        writeln!(self.out, "--- {} ---", view.layer())?;
        write!(self.out, "{}", view)?;
        self.out.flush()?;
        Ok(())
    }

    fn hide(&mut self, layer: OverlayLayer) -> Result<()> {
        // Flash expiry is not announced.
        if layer != OverlayLayer::Flash {
            writeln!(self.out, "--- {} closed ---", layer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_action::overlay::PromptView;

    fn render(f: impl FnOnce(&mut ConsoleSurface<Vec<u8>>)) -> String {
        let mut surface = ConsoleSurface::new(Vec::new());
        f(&mut surface);
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn test_show_flash() {
        let out = render(|s| {
            s.show(&OverlayView::Flash("saved \"edgar\"".to_string()))
                .unwrap()
        });
        assert_eq!(out, "--- flash ---\nsaved \"edgar\"\n");
    }

    #[test]
    fn test_show_prompt_then_hide() {
        let out = render(|s| {
            s.show(&OverlayView::Prompt(PromptView {
                title: "Rename \"edgar\"".to_string(),
                subtitle: "Say the new name...".to_string(),
            }))
            .unwrap();
            s.hide(OverlayLayer::Prompt).unwrap();
            s.hide(OverlayLayer::Flash).unwrap();
        });
        assert!(out.starts_with("--- prompt ---\nRename \"edgar\"\n"));
        assert!(out.ends_with("--- prompt closed ---\n"));
    }
}
