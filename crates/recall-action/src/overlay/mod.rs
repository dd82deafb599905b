//! On-screen overlay.
//!
//! The presenter decides what is shown and for how long; the host draws it
//! through an [`OverlaySurface`]. Layers expire independently, driven by
//! [`OverlayPresenter::tick`].

pub mod view;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use recall_core::config::OverlayConfig;
use recall_core::error::Result;
use tracing::{debug, warn};

pub use view::{
    command_reference, HelpRow, HelpView, LabelPill, LabelsView, OverlayLayer, OverlayView,
    PromptView,
};

/// Something that can draw overlay views. Implemented by the host.
pub trait OverlaySurface {
    /// Draw `view` on its layer, replacing whatever that layer showed.
    fn show(&mut self, view: &OverlayView) -> Result<()>;

    /// Remove a layer.
    fn hide(&mut self, layer: OverlayLayer) -> Result<()>;
}

/// A surface that draws nothing. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl OverlaySurface for NullSurface {
    fn show(&mut self, _view: &OverlayView) -> Result<()> {
        Ok(())
    }

    fn hide(&mut self, _layer: OverlayLayer) -> Result<()> {
        Ok(())
    }
}

/// Owns the surface and the per-layer expiry deadlines.
pub struct OverlayPresenter<S> {
    surface: S,
    durations: BTreeMap<OverlayLayer, Duration>,
    deadlines: BTreeMap<OverlayLayer, Instant>,
}

impl<S: OverlaySurface> OverlayPresenter<S> {
    pub fn new(surface: S, config: &OverlayConfig) -> Self {
        let durations = BTreeMap::from([
            (OverlayLayer::Labels, Duration::from_secs(config.labels_secs)),
            (OverlayLayer::Help, Duration::from_secs(config.help_secs)),
            (OverlayLayer::Prompt, Duration::from_secs(config.prompt_secs)),
            (OverlayLayer::Flash, Duration::from_millis(config.flash_millis)),
        ]);
        Self {
            surface,
            durations,
            deadlines: BTreeMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Show name tags over saved windows. An empty view shows nothing and
    /// returns false.
    pub fn show_labels(&mut self, view: LabelsView) -> bool {
        if view.is_empty() {
            debug!("No saved windows to label");
            return false;
        }
        self.present(OverlayView::Labels(view));
        true
    }

    pub fn show_help(&mut self, view: HelpView) {
        self.present(OverlayView::Help(view));
    }

    pub fn show_prompt(&mut self, title: impl Into<String>, subtitle: impl Into<String>) {
        self.present(OverlayView::Prompt(PromptView {
            title: title.into(),
            subtitle: subtitle.into(),
        }));
    }

    pub fn hide_prompt(&mut self) {
        self.hide_layer(OverlayLayer::Prompt);
    }

    /// Short status message. Replaces any flash already showing.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.present(OverlayView::Flash(message.into()));
    }

    /// Hide labels, help and prompt. A flash runs out on its own.
    pub fn hide(&mut self) {
        for layer in [OverlayLayer::Labels, OverlayLayer::Help, OverlayLayer::Prompt] {
            self.hide_layer(layer);
        }
    }

    /// Whether labels, help or prompt are showing.
    pub fn visible(&self) -> bool {
        self.deadlines.keys().any(|l| *l != OverlayLayer::Flash)
    }

    pub fn is_showing(&self, layer: OverlayLayer) -> bool {
        self.deadlines.contains_key(&layer)
    }

    /// Hide every layer whose deadline has passed and return them.
    pub fn tick(&mut self, now: Instant) -> Vec<OverlayLayer> {
        let expired: Vec<OverlayLayer> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(layer, _)| *layer)
            .collect();
        for layer in &expired {
            debug!(layer = %layer, "Overlay layer expired");
            self.hide_layer(*layer);
        }
        expired
    }

    fn present(&mut self, view: OverlayView) {
        let layer = view.layer();
        if let Err(e) = self.surface.show(&view) {
            warn!(layer = %layer, error = %e, "Overlay surface failed to show view");
            return;
        }
        let duration = self.durations.get(&layer).copied().unwrap_or_default();
        self.deadlines.insert(layer, Instant::now() + duration);
    }

    fn hide_layer(&mut self, layer: OverlayLayer) {
        if self.deadlines.remove(&layer).is_none() {
            return;
        }
        if let Err(e) = self.surface.hide(layer) {
            warn!(layer = %layer, error = %e, "Overlay surface failed to hide layer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::error::RecallError;

    #[derive(Default)]
    struct Recording {
        shown: Vec<OverlayView>,
        hidden: Vec<OverlayLayer>,
        fail: bool,
    }

    impl OverlaySurface for Recording {
        fn show(&mut self, view: &OverlayView) -> Result<()> {
            if self.fail {
                return Err(RecallError::Overlay("no display".to_string()));
            }
            self.shown.push(view.clone());
            Ok(())
        }

        fn hide(&mut self, layer: OverlayLayer) -> Result<()> {
            self.hidden.push(layer);
            Ok(())
        }
    }

    fn presenter() -> OverlayPresenter<Recording> {
        OverlayPresenter::new(Recording::default(), &OverlayConfig::default())
    }

    fn some_labels() -> LabelsView {
        LabelsView {
            placed: vec![],
            missing: vec!["edgar (not found)".to_string()],
        }
    }

    #[test]
    fn test_empty_labels_show_nothing() {
        let mut p = presenter();
        assert!(!p.show_labels(LabelsView::default()));
        assert!(p.surface().shown.is_empty());
        assert!(!p.visible());
    }

    #[test]
    fn test_show_labels() {
        let mut p = presenter();
        assert!(p.show_labels(some_labels()));
        assert!(p.visible());
        assert!(p.is_showing(OverlayLayer::Labels));
    }

    #[test]
    fn test_flash_not_counted_as_visible() {
        let mut p = presenter();
        p.flash("saved \"edgar\"");
        assert!(!p.visible());
        assert!(p.is_showing(OverlayLayer::Flash));
    }

    #[test]
    fn test_hide_keeps_flash() {
        let mut p = presenter();
        p.show_labels(some_labels());
        p.show_prompt("Rename \"edgar\"", "Say the new name...");
        p.flash("hello");
        p.hide();

        assert!(!p.visible());
        assert!(p.is_showing(OverlayLayer::Flash));
        assert_eq!(
            p.surface().hidden,
            vec![OverlayLayer::Labels, OverlayLayer::Prompt]
        );
    }

    #[test]
    fn test_tick_expires_by_layer() {
        let mut p = presenter();
        p.flash("hello");
        p.show_prompt("t", "s");
        let start = Instant::now();

        assert!(p.tick(start).is_empty());

        let expired = p.tick(start + Duration::from_secs(3));
        assert_eq!(expired, vec![OverlayLayer::Flash]);
        assert!(p.is_showing(OverlayLayer::Prompt));

        let expired = p.tick(start + Duration::from_secs(16));
        assert_eq!(expired, vec![OverlayLayer::Prompt]);
        assert!(!p.visible());
    }

    #[test]
    fn test_reshow_resets_deadline() {
        let mut p = presenter();
        p.flash("one");
        p.flash("two");
        assert_eq!(p.surface().shown.len(), 2);
        assert_eq!(p.tick(Instant::now() + Duration::from_secs(3)).len(), 1);
    }

    #[test]
    fn test_surface_failure_is_not_tracked() {
        let mut p = presenter();
        p.surface_mut().fail = true;
        p.show_help(HelpView {
            rows: vec![],
            commands: vec![],
        });
        assert!(!p.visible());
    }
}
