//! Animated dialogs
//!
//! Opening is two-phase: show the dialog, then apply the visible style after
//! a short delay so the transition runs. Closing reverses it: drop the
//! visible style, wait for the transition, then close the element.
//!
//! A re-open during the closing window wins: the pending close is discarded.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The raw dialog element
pub trait DialogSurface: Send + Sync {
    /// Show the element (modal, backdrop active)
    fn show(&self);
    /// Apply or remove the visible style
    fn set_visible(&self, visible: bool);
    /// Close the element
    fn close(&self);
    /// Whether the element is currently shown
    fn is_open(&self) -> bool;
}

impl<T: DialogSurface + ?Sized> DialogSurface for Arc<T> {
    fn show(&self) {
        (**self).show();
    }

    fn set_visible(&self, visible: bool) {
        (**self).set_visible(visible);
    }

    fn close(&self) {
        (**self).close();
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// A dialog whose open/close complete asynchronously
#[async_trait]
pub trait AnimatedDialog: Send + Sync {
    /// Resolves once the dialog is fully shown
    async fn begin_open(&self);

    /// Resolves once the dialog is fully closed (or a re-open superseded it)
    async fn begin_close(&self);

    /// Whether the dialog is currently shown
    fn is_open(&self) -> bool;
}

#[async_trait]
impl<T: AnimatedDialog + ?Sized> AnimatedDialog for Arc<T> {
    async fn begin_open(&self) {
        (**self).begin_open().await;
    }

    async fn begin_close(&self) {
        (**self).begin_close().await;
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

#[async_trait]
impl<T: AnimatedDialog + ?Sized> AnimatedDialog for Box<T> {
    async fn begin_open(&self) {
        (**self).begin_open().await;
    }

    async fn begin_close(&self) {
        (**self).begin_close().await;
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Fixed-delay transitions over a `DialogSurface`
#[derive(Debug)]
pub struct TimedDialog<D> {
    surface: D,
    open_delay: Duration,
    close_delay: Duration,
    /// Bumped by every open; a close only completes if it is still current
    generation: AtomicU64,
}

impl<D: DialogSurface> TimedDialog<D> {
    /// Create dialog with the given delays
    #[inline]
    #[must_use]
    pub fn new(surface: D, open_delay: Duration, close_delay: Duration) -> Self {
        Self {
            surface,
            open_delay,
            close_delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Underlying surface
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &D {
        &self.surface
    }
}

#[async_trait]
impl<D: DialogSurface> AnimatedDialog for TimedDialog<D> {
    async fn begin_open(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.surface.is_open() {
            self.surface.set_visible(false);
            self.surface.close();
        }
        self.surface.show();
        tokio::time::sleep(self.open_delay).await;
        self.surface.set_visible(true);
    }

    async fn begin_close(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        self.surface.set_visible(false);
        tokio::time::sleep(self.close_delay).await;
        if self.generation.load(Ordering::SeqCst) == generation {
            self.surface.close();
        } else {
            tracing::debug!("close superseded by re-open");
        }
    }

    fn is_open(&self) -> bool {
        self.surface.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        open: Mutex<bool>,
        visible: Mutex<bool>,
        log: Mutex<Vec<&'static str>>,
    }

    impl DialogSurface for Recorder {
        fn show(&self) {
            *self.open.lock() = true;
            self.log.lock().push("show");
        }

        fn set_visible(&self, visible: bool) {
            *self.visible.lock() = visible;
            self.log.lock().push(if visible { "visible" } else { "hidden" });
        }

        fn close(&self) {
            *self.open.lock() = false;
            self.log.lock().push("close");
        }

        fn is_open(&self) -> bool {
            *self.open.lock()
        }
    }

    fn dialog() -> TimedDialog<Arc<Recorder>> {
        TimedDialog::new(
            Arc::new(Recorder::default()),
            Duration::from_millis(10),
            Duration::from_millis(300),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn open_applies_visible_after_delay() {
        let dialog = dialog();
        dialog.begin_open().await;

        assert!(dialog.is_open());
        assert!(*dialog.surface().visible.lock());
        assert_eq!(*dialog.surface().log.lock(), vec!["show", "visible"]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_waits_then_closes() {
        let dialog = dialog();
        dialog.begin_open().await;

        let start = tokio::time::Instant::now();
        dialog.begin_close().await;
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(!dialog.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_during_close_window_stays_open() {
        let dialog = Arc::new(dialog());
        dialog.begin_open().await;

        let closing = {
            let dialog = dialog.clone();
            tokio::spawn(async move { dialog.begin_close().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        dialog.begin_open().await;
        closing.await.unwrap();

        assert!(dialog.is_open());
        assert!(*dialog.surface().visible.lock());
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_of_open_dialog_closes_first() {
        let dialog = dialog();
        dialog.begin_open().await;
        dialog.begin_open().await;

        assert_eq!(
            *dialog.surface().log.lock(),
            vec!["show", "visible", "hidden", "close", "show", "visible"]
        );
    }
}
