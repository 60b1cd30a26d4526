//! Lazily mounted modals
//!
//! A modal's markup is fetched and attached on first use, its listeners are
//! bound on first show, and neither happens twice:
//!
//! - `Unmounted` -> `MountedUnbound` when the markup is attached
//! - `MountedUnbound` -> `MountedBound` when listeners are bound
//!
//! A failed fetch leaves the modal `Unmounted` so the next use retries.

use crate::content::{PartialContentProvider, View};
use crate::dialog::AnimatedDialog;
use crate::error::UiError;
use crate::host::ModalHost;
use tokio::sync::Mutex;

/// Lifecycle of a modal's markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalState {
    /// Markup not in the page yet
    Unmounted,
    /// Markup attached, listeners not bound
    MountedUnbound,
    /// Markup attached and listeners bound
    MountedBound,
}

/// Validate a lifecycle transition
///
/// # Errors
/// - `UiError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: ModalState, to: ModalState) -> Result<(), UiError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(UiError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: ModalState) -> &'static [ModalState] {
    use ModalState::{MountedBound, MountedUnbound, Unmounted};
    match from {
        Unmounted => &[MountedUnbound],
        MountedUnbound => &[MountedBound],
        MountedBound => &[],
    }
}

/// A modal backed by a partial view and an animated dialog
#[derive(Debug)]
pub struct Modal<D> {
    view: View,
    dialog: D,
    state: Mutex<ModalState>,
}

impl<D: AnimatedDialog> Modal<D> {
    /// Create an unmounted modal
    #[must_use]
    pub fn new(view: View, dialog: D) -> Self {
        Self {
            view,
            dialog,
            state: Mutex::new(ModalState::Unmounted),
        }
    }

    /// View this modal renders
    #[inline]
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// Current lifecycle state
    pub async fn state(&self) -> ModalState {
        *self.state.lock().await
    }

    /// Whether the dialog is currently shown
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// Fetch and attach the markup unless already attached
    ///
    /// # Errors
    /// - `UiError::NotLoaded` if the markup could not be fetched
    /// - `UiError::MissingElement` if the host has nowhere to put it
    pub async fn ensure_mounted(
        &self,
        provider: &dyn PartialContentProvider,
        host: &dyn ModalHost,
    ) -> Result<(), UiError> {
        // Held across the fetch so concurrent callers never attach twice.
        let mut state = self.state.lock().await;
        if *state != ModalState::Unmounted {
            return Ok(());
        }

        let markup = match provider.fetch(self.view).await {
            Ok(markup) => markup,
            Err(source) => {
                tracing::warn!(view = ?self.view, error = %source, "modal markup not loaded");
                return Err(UiError::NotLoaded {
                    view: self.view,
                    source,
                });
            }
        };

        host.attach(self.view, &markup)?;
        validate_transition(*state, ModalState::MountedUnbound)?;
        *state = ModalState::MountedUnbound;
        tracing::debug!(view = ?self.view, "modal mounted");
        Ok(())
    }

    /// Bind listeners unless already bound
    ///
    /// # Errors
    /// - `UiError::IllegalTransition` if the modal is not mounted
    pub async fn ensure_bound(&self, host: &dyn ModalHost) -> Result<(), UiError> {
        let mut state = self.state.lock().await;
        if *state == ModalState::MountedBound {
            return Ok(());
        }

        validate_transition(*state, ModalState::MountedBound)?;
        host.bind(self.view, self.view.listeners());
        *state = ModalState::MountedBound;
        Ok(())
    }

    /// Mount, bind and open in one go
    ///
    /// # Errors
    /// - Propagates `ensure_mounted` and `ensure_bound` failures
    pub async fn show(
        &self,
        provider: &dyn PartialContentProvider,
        host: &dyn ModalHost,
    ) -> Result<(), UiError> {
        self.ensure_mounted(provider, host).await?;
        self.ensure_bound(host).await?;
        self.open().await;
        Ok(())
    }

    /// Open the dialog; resolves when the open transition ends
    pub async fn open(&self) {
        self.dialog.begin_open().await;
    }

    /// Close the dialog; resolves when the close transition ends
    pub async fn close(&self) {
        self.dialog.begin_close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Markup;
    use crate::error::ContentError;
    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Flaky {
        fail_first: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PartialContentProvider for Flaky {
        async fn fetch(&self, view: View) -> Result<Markup, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(ContentError::Status { view, status: 502 });
            }
            Ok(Markup::new("<dialog></dialog>"))
        }
    }

    #[derive(Default)]
    struct Host {
        attached: SyncMutex<Vec<View>>,
        bound: SyncMutex<Vec<View>>,
    }

    impl ModalHost for Host {
        fn attach(&self, view: View, _markup: &Markup) -> Result<(), UiError> {
            self.attached.lock().push(view);
            Ok(())
        }

        fn bind(&self, view: View, _listeners: &[crate::host::Listener]) {
            self.bound.lock().push(view);
        }

        fn navigate(&self, _route: &str) {}

        fn confirm(&self, _prompt: &str) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct Instant {
        open: AtomicBool,
    }

    #[async_trait]
    impl AnimatedDialog for Instant {
        async fn begin_open(&self) {
            self.open.store(true, Ordering::SeqCst);
        }

        async fn begin_close(&self) {
            self.open.store(false, Ordering::SeqCst);
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        assert!(validate_transition(ModalState::Unmounted, ModalState::MountedUnbound).is_ok());
        assert!(validate_transition(ModalState::MountedUnbound, ModalState::MountedBound).is_ok());
        assert!(validate_transition(ModalState::Unmounted, ModalState::MountedBound).is_err());
        assert!(validate_transition(ModalState::MountedBound, ModalState::Unmounted).is_err());
        assert!(allowed_transitions(ModalState::MountedBound).is_empty());
    }

    #[tokio::test]
    async fn shows_attach_and_bind_once() {
        let modal = Modal::new(View::CartModal, Instant::default());
        let provider = Flaky::default();
        let host = Host::default();

        modal.show(&provider, &host).await.unwrap();
        modal.close().await;
        modal.show(&provider, &host).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*host.attached.lock(), vec![View::CartModal]);
        assert_eq!(*host.bound.lock(), vec![View::CartModal]);
        assert_eq!(modal.state().await, ModalState::MountedBound);
        assert!(modal.is_open());
    }

    #[tokio::test]
    async fn failed_fetch_stays_unmounted_and_retries() {
        let modal = Modal::new(View::InstallationModal, Instant::default());
        let provider = Flaky {
            fail_first: AtomicBool::new(true),
            ..Flaky::default()
        };
        let host = Host::default();

        let err = modal.show(&provider, &host).await.unwrap_err();
        assert!(err.is_not_loaded());
        assert_eq!(modal.state().await, ModalState::Unmounted);
        assert!(!modal.is_open());

        modal.show(&provider, &host).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(modal.is_open());
    }

    #[tokio::test]
    async fn binding_before_mount_is_rejected() {
        let modal = Modal::new(View::CartModal, Instant::default());
        let err = modal.ensure_bound(&Host::default()).await.unwrap_err();
        assert!(matches!(err, UiError::IllegalTransition { .. }));
    }
}
