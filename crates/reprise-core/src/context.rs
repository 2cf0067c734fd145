//! Per-run execution context.
//!
//! A [`ScriptRunContext`] is created by [`Session::start_run`] and passed
//! explicitly to every widget declaration of that run. It owns everything
//! that must not outlive the run: the set of widget IDs seen so far, the form
//! stack, the emitted declarations and the collected warnings.
//!
//! Dropping a context without calling [`ScriptRunContext::finish`] aborts
//! the run: its pending session-state writes, form-buffer changes and the
//! callbacks and deserializers it registered are thrown away, so nothing
//! half-registered leaks into the next run.

use crate::collections::map::HashSet;
use crate::declaration::WidgetDeclaration;
use crate::error::WidgetError;
use crate::form::{FormBuffers, FormScope};
use crate::record::WidgetId;
use crate::session::{RunOutput, Session};
use crate::session_state::{SessionState, SessionStateProxy};
use crate::store::{Registrations, WidgetStateStore};
use serde_json::Value;

pub type RunId = u64;

/// A non-fatal problem in user code, shown to the script author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserWarning {
    pub widget_id: WidgetId,
    pub message: String,
}

pub struct ScriptRunContext<'s> {
    session: &'s mut Session,
    run_id: RunId,
    widget_ids_this_run: HashSet<WidgetId>,
    form: FormScope,
    forms_at_start: FormBuffers,
    registrations_at_start: Registrations,
    declarations: Vec<WidgetDeclaration>,
    warnings: Vec<UserWarning>,
    finished: bool,
}

impl<'s> ScriptRunContext<'s> {
    pub(crate) fn new(session: &'s mut Session, run_id: RunId) -> Self {
        let forms_at_start = session.forms.clone();
        let registrations_at_start = session.store.registrations();
        Self {
            session,
            run_id,
            widget_ids_this_run: HashSet::default(),
            form: FormScope::new(),
            forms_at_start,
            registrations_at_start,
            declarations: Vec::new(),
            warnings: Vec::new(),
            finished: false,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn is_in_form(&self) -> bool {
        self.form.is_in_form()
    }

    pub fn current_form_id(&self) -> &str {
        self.form.current_form_id()
    }

    pub fn enter_form(&mut self, key: &str) -> Result<(), WidgetError> {
        self.form.enter(key)?;
        log::trace!("run {}: entering form '{key}'", self.run_id);
        Ok(())
    }

    pub fn exit_form(&mut self) {
        self.form.exit();
    }

    /// Runs `content` with `key` as the enclosing form.
    pub fn with_form<R>(
        &mut self,
        key: &str,
        content: impl FnOnce(&mut Self) -> Result<R, WidgetError>,
    ) -> Result<R, WidgetError> {
        self.enter_form(key)?;
        let result = content(self);
        self.exit_form();
        result
    }

    pub fn session_state(&mut self) -> SessionStateProxy<'_> {
        let session = &mut *self.session;
        let state = session.state.get_or_insert_with(SessionState::new);
        SessionStateProxy::new(state, &session.store, &self.widget_ids_this_run)
    }

    pub fn widgets(&self) -> &WidgetStateStore {
        &self.session.store
    }

    pub(crate) fn widgets_mut(&mut self) -> &mut WidgetStateStore {
        &mut self.session.store
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.widget_ids_this_run.contains(id)
    }

    pub fn widget_ids(&self) -> &HashSet<WidgetId> {
        &self.widget_ids_this_run
    }

    /// Returns false if `id` was already registered in this run.
    pub(crate) fn mark_registered(&mut self, id: WidgetId) -> bool {
        self.widget_ids_this_run.insert(id)
    }

    /// The unsubmitted value of `id` in the enclosing form.
    pub fn buffered_value(&self, id: &str) -> Option<&Value> {
        self.session.forms.get(self.form.current_form_id(), id)
    }

    pub(crate) fn buffer_value(&mut self, id: WidgetId, value: Value) {
        let form_id = self.form.current_form_id();
        self.session.forms.buffer(form_id, id, value);
    }

    /// Commits the buffered values of `form_id` into the pending generation
    /// and empties the buffer. Called when the form's submit button fires.
    pub fn commit_form(&mut self, form_id: &str) -> usize {
        let buffered = self.session.forms.take(form_id);
        let count = buffered.len();
        let state = self.session.state.get_or_insert_with(SessionState::new);
        for (id, value) in buffered {
            state.insert_pending(String::from(id.as_str()), value);
        }
        log::debug!(
            "run {}: form '{form_id}' submitted, committed {count} values",
            self.run_id
        );
        count
    }

    pub fn emit(&mut self, declaration: WidgetDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn declarations(&self) -> &[WidgetDeclaration] {
        &self.declarations
    }

    /// Logs a user-code warning and, unless disabled, surfaces it in the
    /// run output.
    pub fn warn(&mut self, widget_id: WidgetId, message: impl Into<String>) {
        let message = message.into();
        log::warn!("widget {widget_id}: {message}");
        if self.session.options.surface_warnings {
            self.warnings.push(UserWarning { widget_id, message });
        }
    }

    pub fn warnings(&self) -> &[UserWarning] {
        &self.warnings
    }

    /// Completes the run: resets triggers, culls widgets that weren't
    /// declared and hands back what the run produced.
    pub fn finish(mut self) -> RunOutput {
        self.finished = true;
        let session = &mut *self.session;
        session.store.reset_triggers();
        if session.options.cull_after_run {
            session.store.cull(&self.widget_ids_this_run);
            if let Some(state) = session.state.as_mut() {
                state.cull_widget_keys(&self.widget_ids_this_run);
            }
            session.forms.retain_forms(self.form.seen());
        }
        log::debug!(
            "run {} finished with {} widgets",
            self.run_id,
            self.widget_ids_this_run.len()
        );
        RunOutput {
            run_id: self.run_id,
            declarations: std::mem::take(&mut self.declarations),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn abort(&mut self) {
        let session = &mut *self.session;
        if let Some(state) = session.state.as_mut() {
            state.discard_pending();
        }
        session.forms = std::mem::take(&mut self.forms_at_start);
        session
            .store
            .restore_registrations(std::mem::take(&mut self.registrations_at_start));
        session.store.reset_triggers();
        log::debug!("run {} aborted", self.run_id);
    }
}

impl Drop for ScriptRunContext<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.abort();
        }
    }
}
