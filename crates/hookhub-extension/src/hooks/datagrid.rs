//! Data-grid columns hook: contributes columns to a grid type.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hookhub_core::result::AppResult;

use super::base::{ExtensionHook, HookKind, HookState};
use crate::extension::ExtensionContext;
use crate::host::HookHost;
use crate::host::datagrid::{Column, ColumnRegistry};

/// Adds columns to a grid while attached and removes them on shutdown.
#[derive(Debug)]
pub struct DataGridColumnsHook {
    state: HookState,
    host: Arc<HookHost>,
    grid: Arc<dyn ColumnRegistry>,
    columns: Vec<Column>,
}

impl DataGridColumnsHook {
    /// Adds `columns`, in order, to `grid`.
    ///
    /// If any column id collides, the columns already added by this call are
    /// removed again and the configuration error is returned.
    pub fn attach(
        ctx: &ExtensionContext,
        grid: Arc<dyn ColumnRegistry>,
        columns: Vec<Column>,
    ) -> AppResult<Arc<Self>> {
        let state = HookState::new(ctx.info().clone());
        let owner = Some(state.id());

        for (index, column) in columns.iter().enumerate() {
            if let Err(e) = grid.add_column(column.clone(), owner) {
                warn!(
                    extension_id = %ctx.info().id,
                    grid = %grid.grid_name(),
                    column = %column.id,
                    error = %e,
                    "Column rejected, rolling back"
                );
                for added in &columns[..index] {
                    grid.remove_column(&added.id, owner);
                }
                return Err(e);
            }
        }

        let hook = Arc::new(Self {
            state,
            host: ctx.host().clone(),
            grid,
            columns,
        });

        hook.host.datagrid_hooks.add_hook(hook.clone());
        hook.state.mark_initialized();
        ctx.track(hook.clone());

        info!(
            extension_id = %ctx.info().id,
            hook_id = %hook.id(),
            grid = %hook.grid.grid_name(),
            columns = hook.columns.len(),
            "Data-grid columns hook attached"
        );

        Ok(hook)
    }

    /// Returns the contributed columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl ExtensionHook for DataGridColumnsHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn kind(&self) -> HookKind {
        HookKind::DataGridColumns
    }

    fn shutdown(&self) -> AppResult<()> {
        self.state.begin_shutdown(&self.kind())?;
        self.host.datagrid_hooks.remove_hook(self.id());

        for column in &self.columns {
            if !self.grid.remove_column(&column.id, Some(self.id())) {
                debug!(
                    grid = %self.grid.grid_name(),
                    column = %column.id,
                    "Column was already removed or is owned by another hook"
                );
            }
        }

        info!(
            extension_id = %self.state.extension().id,
            hook_id = %self.id(),
            grid = %self.grid.grid_name(),
            "Data-grid columns hook shut down"
        );
        Ok(())
    }
}
