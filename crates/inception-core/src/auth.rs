// ── Re-authentication gate ──
//
// Shared by both polling tasks. Either task trips it on `Unauthorized`;
// both then park until new credentials clear it.

use tokio::sync::watch;

#[derive(Debug)]
pub(crate) struct AuthGate {
    required: watch::Sender<bool>,
}

impl AuthGate {
    pub(crate) fn new() -> Self {
        let (required, _) = watch::channel(false);
        Self { required }
    }

    pub(crate) fn is_required(&self) -> bool {
        *self.required.borrow()
    }

    /// Returns `true` if this call moved the gate into the tripped state.
    pub(crate) fn trip(&self) -> bool {
        self.required.send_if_modified(|required| !std::mem::replace(required, true))
    }

    /// Returns `true` if the gate was tripped.
    pub(crate) fn clear(&self) -> bool {
        self.required.send_if_modified(|required| std::mem::replace(required, false))
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.required.subscribe()
    }

    pub(crate) async fn wait_required(&self) {
        let mut rx = self.required.subscribe();
        let _ = rx.wait_for(|required| *required).await;
    }

    pub(crate) async fn wait_cleared(&self) {
        let mut rx = self.required.subscribe();
        let _ = rx.wait_for(|required| !*required).await;
    }
}
