//! Signal hook: keeps a receiver connected to a signal while attached.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use hookhub_core::result::AppResult;

use super::base::{ExtensionHook, HookKind, HookState};
use crate::extension::ExtensionContext;
use crate::host::HookHost;
use crate::host::signals::{Signal, SignalCallback};
use crate::ids::DispatchUid;

/// Connects a callback to a signal under a fresh dispatch uid, and
/// disconnects by that uid on shutdown.
///
/// The connection holds the callback strongly, so it lives exactly as long
/// as the hook is attached.
pub struct SignalHook {
    state: HookState,
    host: Arc<HookHost>,
    signal: Arc<Signal>,
    callback: SignalCallback,
    sender: Option<String>,
    dispatch_uid: DispatchUid,
}

impl fmt::Debug for SignalHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHook")
            .field("state", &self.state)
            .field("signal", &self.signal.name())
            .field("sender", &self.sender)
            .field("dispatch_uid", &self.dispatch_uid)
            .finish()
    }
}

impl SignalHook {
    /// Connects `callback` to `signal`, optionally only for events fired by
    /// `sender`.
    pub fn attach(
        ctx: &ExtensionContext,
        signal: Arc<Signal>,
        callback: SignalCallback,
        sender: Option<String>,
    ) -> AppResult<Arc<Self>> {
        let hook = Arc::new(Self {
            state: HookState::new(ctx.info().clone()),
            host: ctx.host().clone(),
            signal,
            callback,
            sender,
            dispatch_uid: DispatchUid::new(),
        });

        hook.signal.connect(
            hook.callback.clone(),
            hook.sender.clone(),
            hook.dispatch_uid,
        );
        hook.host.signal_hooks.add_hook(hook.clone());
        hook.state.mark_initialized();
        ctx.track(hook.clone());

        info!(
            extension_id = %ctx.info().id,
            hook_id = %hook.id(),
            signal = %hook.signal.name(),
            dispatch_uid = %hook.dispatch_uid,
            "Signal hook attached"
        );

        Ok(hook)
    }

    /// Returns the signal this hook is connected to.
    pub fn signal(&self) -> &Arc<Signal> {
        &self.signal
    }

    /// Returns the uid addressing this hook's connection.
    pub fn dispatch_uid(&self) -> DispatchUid {
        self.dispatch_uid
    }
}

impl ExtensionHook for SignalHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn kind(&self) -> HookKind {
        HookKind::Signal
    }

    fn shutdown(&self) -> AppResult<()> {
        self.state.begin_shutdown(&self.kind())?;
        self.host.signal_hooks.remove_hook(self.id());

        if !self.signal.disconnect(self.dispatch_uid) {
            debug!(
                hook_id = %self.id(),
                signal = %self.signal.name(),
                "Receiver was already disconnected"
            );
        }

        info!(
            extension_id = %self.state.extension().id,
            hook_id = %self.id(),
            signal = %self.signal.name(),
            "Signal hook shut down"
        );
        Ok(())
    }
}
