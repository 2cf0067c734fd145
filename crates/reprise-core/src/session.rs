//! Session lifecycle.
//!
//! A [`Session`] owns the widget store, the (lazily created) session state
//! and the form buffers of one client. Client updates and runs are processed
//! strictly in this order:
//!
//! `enqueue_client_update` → `set_state` → `dispatch_callbacks` → `promote`
//! → run → `finish`
//!
//! Each step relies on the generation the previous one established, so the
//! session exposes them as a fixed pipeline rather than as separate knobs.

use crate::collections::map::HashSet;
use crate::context::{RunId, ScriptRunContext, UserWarning};
use crate::declaration::{WidgetDeclaration, WidgetKind};
use crate::error::WidgetError;
use crate::form::FormBuffers;
use crate::record::{WidgetId, WidgetStates};
use crate::session_state::{SessionState, SessionStateProxy};
use crate::store::{coalesce, WidgetStateStore};

#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Drop state of widgets the finished run didn't declare.
    pub cull_after_run: bool,
    /// Collect user-code warnings into [`RunOutput::warnings`] besides
    /// logging them.
    pub surface_warnings: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            cull_after_run: true,
            surface_warnings: true,
        }
    }
}

impl SessionOptions {
    pub fn with_cull_after_run(mut self, cull: bool) -> Self {
        self.cull_after_run = cull;
        self
    }

    pub fn with_surface_warnings(mut self, surface: bool) -> Self {
        self.surface_warnings = surface;
        self
    }
}

/// What a completed run hands to the rendering layer.
#[derive(Clone, Debug, Default)]
pub struct RunOutput {
    pub run_id: RunId,
    pub declarations: Vec<WidgetDeclaration>,
    pub warnings: Vec<UserWarning>,
}

impl RunOutput {
    pub fn declaration(&self, id: &str) -> Option<&WidgetDeclaration> {
        self.declarations
            .iter()
            .find(|declaration| declaration.id.as_str() == id)
    }

    pub fn find(&self, kind: WidgetKind, label: &str) -> Option<&WidgetDeclaration> {
        self.declarations
            .iter()
            .find(|declaration| declaration.kind == kind && declaration.label() == Some(label))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub(crate) options: SessionOptions,
    pub(crate) store: WidgetStateStore,
    pub(crate) state: Option<SessionState>,
    pub(crate) forms: FormBuffers,
    queued_update: Option<WidgetStates>,
    next_run_id: RunId,
    no_widgets: HashSet<WidgetId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Queues a batch from the client for the next run.
    ///
    /// A batch that is still waiting is coalesced with the new one, so a
    /// click in the older batch survives even if the newer one already
    /// carries the button's reset.
    pub fn enqueue_client_update(&mut self, batch: WidgetStates) {
        let merged = match self.queued_update.take() {
            Some(queued) => {
                log::debug!("coalescing client update into a queued one");
                coalesce(&queued, &batch)
            }
            None => batch,
        };
        self.queued_update = Some(merged);
    }

    pub fn has_queued_update(&self) -> bool {
        self.queued_update.is_some()
    }

    /// Consumes the queued update (if any) and opens a new run.
    ///
    /// An error from an on-change callback aborts before the run starts.
    /// Session state goes back to how it was before dispatch and the batch's
    /// clicks are dropped.
    pub fn start_run(&mut self) -> Result<ScriptRunContext<'_>, WidgetError> {
        if let Some(batch) = self.queued_update.take() {
            self.store.set_state(batch.clone());
            let state = self.state.get_or_insert_with(SessionState::new);
            let before_dispatch = state.clone();
            let fired = match self.store.dispatch_callbacks(&batch, state) {
                Ok(fired) => fired,
                Err(err) => {
                    *state = before_dispatch;
                    self.store.reset_triggers();
                    log::debug!("on-change callback failed, run not started: {err}");
                    return Err(err);
                }
            };
            log::trace!("applied client batch of {} records, {fired} callbacks fired", batch.len());
        }
        if let Some(state) = self.state.as_mut() {
            state.promote();
        }
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        log::debug!("starting run {run_id}");
        Ok(ScriptRunContext::new(self, run_id))
    }

    /// Starts a run, executes `script` in it and finishes it. An error from
    /// the script aborts the run and is returned as is.
    pub fn run<R>(
        &mut self,
        script: impl FnOnce(&mut ScriptRunContext<'_>) -> Result<R, WidgetError>,
    ) -> Result<(R, RunOutput), WidgetError> {
        let mut ctx = self.start_run()?;
        let value = script(&mut ctx)?;
        Ok((value, ctx.finish()))
    }

    /// The store's current records, as the client should see them.
    pub fn client_state(&self) -> WidgetStates {
        self.store.marshall()
    }

    pub fn widgets(&self) -> &WidgetStateStore {
        &self.store
    }

    /// Session state outside of any run. No widget is registered, so writes
    /// never conflict.
    pub fn session_state(&mut self) -> SessionStateProxy<'_> {
        let state = self.state.get_or_insert_with(|| {
            log::trace!("creating session state");
            SessionState::new()
        });
        SessionStateProxy::new(state, &self.store, &self.no_widgets)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
