//! The handle scripts declare widgets through.

use reprise_core::{
    callback_from, CallbackArgs, ScriptRunContext, SessionStateProxy, Value, WidgetCallback,
    WidgetError,
};

/// Declares widgets into one run.
///
/// A `Ui` built with [`Ui::detached`] has no run behind it. Every widget then
/// reports its default and nothing is registered, which keeps scripts usable
/// outside the interactive runtime.
pub struct Ui<'a, 's> {
    ctx: Option<&'a mut ScriptRunContext<'s>>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn new(ctx: &'a mut ScriptRunContext<'s>) -> Self {
        Self { ctx: Some(ctx) }
    }

    pub fn detached() -> Self {
        Self { ctx: None }
    }

    pub fn is_detached(&self) -> bool {
        self.ctx.is_none()
    }

    pub fn is_in_form(&self) -> bool {
        self.ctx.as_deref().is_some_and(ScriptRunContext::is_in_form)
    }

    pub fn current_form_id(&self) -> &str {
        self.ctx
            .as_deref()
            .map(ScriptRunContext::current_form_id)
            .unwrap_or("")
    }

    /// Declares the widgets of `content` inside form `key`. Their values are
    /// held back until the form's submit button fires.
    pub fn form<R>(
        &mut self,
        key: &str,
        content: impl FnOnce(&mut Self) -> Result<R, WidgetError>,
    ) -> Result<R, WidgetError> {
        if let Some(ctx) = self.ctx.as_deref_mut() {
            ctx.enter_form(key)?;
        }
        let result = content(self);
        if let Some(ctx) = self.ctx.as_deref_mut() {
            ctx.exit_form();
        }
        result
    }

    /// Session state of the run. `None` when detached.
    pub fn session_state(&mut self) -> Option<SessionStateProxy<'_>> {
        self.ctx.as_deref_mut().map(ScriptRunContext::session_state)
    }

    pub(crate) fn ctx(&mut self) -> Option<&mut ScriptRunContext<'s>> {
        self.ctx.as_deref_mut()
    }
}

/// An on-change callback and the arguments it is called with.
#[derive(Clone)]
pub struct OnChange {
    pub(crate) callback: WidgetCallback,
    pub(crate) args: CallbackArgs,
}

impl OnChange {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut SessionStateProxy<'_>, &[Value]) -> Result<(), WidgetError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            callback: callback_from(callback),
            args: CallbackArgs::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }
}

impl std::fmt::Debug for OnChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnChange").field("args", &self.args).finish()
    }
}
