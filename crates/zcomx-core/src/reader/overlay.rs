use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Page-number box, prev/next buttons and help/close controls
///
/// Visible after any interaction, fades out once `hide` has been armed and no
/// `show` arrives before the delay runs out. The hide timer runs on the tokio
/// runtime and is aborted when the overlay is dropped.
#[derive(Debug)]
pub struct ControlsOverlay {
    visible: Arc<AtomicBool>,
    hide_timer: Option<JoinHandle<()>>,
}

impl Default for ControlsOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlsOverlay {
    pub fn new() -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(true)),
            hide_timer: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Cancel a pending hide and show the controls
    pub fn show(&mut self) {
        self.cancel_timer();
        self.visible.store(true, Ordering::Relaxed);
    }

    /// Hide the controls after `delay` unless `show` is called first
    ///
    /// Must be called from within a tokio runtime.
    pub fn hide(&mut self, delay: Duration) {
        self.cancel_timer();

        if delay.is_zero() {
            self.visible.store(false, Ordering::Relaxed);
            return;
        }

        let visible = Arc::clone(&self.visible);
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            visible.store(false, Ordering::Relaxed);
        }));
    }

    /// Show now, hide after `delay`
    pub fn touch(&mut self, delay: Duration) {
        self.show();
        self.hide(delay);
    }

    pub fn has_pending_hide(&self) -> bool {
        self.hide_timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ControlsOverlay {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hide_after_delay() {
        let mut overlay = ControlsOverlay::new();
        overlay.hide(Duration::from_millis(500));
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_cancels_pending_hide() {
        let mut overlay = ControlsOverlay::new();
        overlay.hide(Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(300)).await;

        overlay.show();
        assert!(!overlay.has_pending_hide());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_rearms_timer() {
        let mut overlay = ControlsOverlay::new();
        overlay.touch(Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(400)).await;

        overlay.touch(Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn test_zero_delay_hides_immediately() {
        let mut overlay = ControlsOverlay::new();
        overlay.hide(Duration::ZERO);
        assert!(!overlay.is_visible());
        overlay.show();
        assert!(overlay.is_visible());
    }
}
