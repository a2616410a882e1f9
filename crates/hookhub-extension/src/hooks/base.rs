//! Base contract shared by every hook kind.
//!
//! A hook instance is one attachment of one extension to one hook kind.
//! Creating it performs the kind-specific attach side effect and records it
//! in the kind's [`HookPoint`](super::registry::HookPoint); `shutdown`
//! reverses both exactly once.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::error;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::ids::HookId;
use crate::info::ExtensionInfo;

/// The built-in hook kinds, plus an escape hatch for host-defined kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// URL patterns added to the dynamic URL table.
    Url,
    /// A signal receiver connection.
    Signal,
    /// A named template insertion point.
    Template,
    /// Columns contributed to a data grid.
    DataGridColumns,
    /// A kind defined by the host application.
    Custom(String),
}

impl HookKind {
    /// Returns the string name of this hook kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url => "url",
            Self::Signal => "signal",
            Self::Template => "template",
            Self::DataGridColumns => "datagrid_columns",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping every hook instance carries: identity, owner and the
/// `initialized` flag.
#[derive(Debug)]
pub struct HookState {
    id: HookId,
    extension: Arc<ExtensionInfo>,
    initialized: AtomicBool,
}

impl HookState {
    /// Creates state for a hook that is not yet attached.
    pub fn new(extension: Arc<ExtensionInfo>) -> Self {
        Self {
            id: HookId::new(),
            extension,
            initialized: AtomicBool::new(false),
        }
    }

    /// Returns the hook's identity.
    pub fn id(&self) -> HookId {
        self.id
    }

    /// Returns metadata of the extension that created the hook.
    pub fn extension(&self) -> &Arc<ExtensionInfo> {
        &self.extension
    }

    /// Returns whether the hook is currently attached.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Marks the hook as attached. Called once attach has fully succeeded.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Claims the right to shut the hook down.
    ///
    /// Succeeds exactly once per successful attach. A second call, or a call
    /// on a hook that never finished attaching, is a logic error.
    pub fn begin_shutdown(&self, kind: &HookKind) -> AppResult<()> {
        if self
            .initialized
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            error!(
                hook_id = %self.id,
                hook_kind = %kind,
                extension_id = %self.extension.id,
                "Shutdown called on a hook that is not initialized"
            );
            return Err(AppError::logic(format!(
                "{kind} hook {} of extension '{}' is not initialized",
                self.id, self.extension.id
            )));
        }
        Ok(())
    }
}

/// Uniform contract over every hook kind.
///
/// The extension lifecycle only needs this trait to disable an arbitrary mix
/// of hooks.
pub trait ExtensionHook: Send + Sync + fmt::Debug {
    /// Returns the hook's bookkeeping state.
    fn state(&self) -> &HookState;

    /// Returns the kind of this hook.
    fn kind(&self) -> HookKind;

    /// Detaches the hook: removes it from its kind's registry and reverses
    /// the kind-specific side effect.
    fn shutdown(&self) -> AppResult<()>;

    /// Returns the hook's identity.
    fn id(&self) -> HookId {
        self.state().id()
    }

    /// Returns whether the hook is currently attached.
    fn is_initialized(&self) -> bool {
        self.state().is_initialized()
    }
}
