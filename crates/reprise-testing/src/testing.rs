use crate::client::SimulatedClient;
use crate::error::TestRuleError;
use reprise_core::{
    RunOutput, ScriptRunContext, Session, SessionOptions, SessionStateProxy, WidgetDeclaration,
    WidgetError, WidgetKind, WidgetStates, WidgetValue,
};

type Script<R> = Box<dyn FnMut(&mut ScriptRunContext<'_>) -> Result<R, WidgetError>>;

/// Headless harness for exercising scripts in tests.
///
/// `ScriptTestRule` owns a [`Session`] and a [`SimulatedClient`]. Each
/// interaction is turned into a client batch, the script is rerun against
/// it and the client renders the result, the way a browser and the server
/// would take turns.
pub struct ScriptTestRule<R = ()> {
    session: Session,
    client: SimulatedClient,
    script: Option<Script<R>>,
    value: Option<R>,
    output: Option<RunOutput>,
}

impl<R> ScriptTestRule<R> {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            session: Session::with_options(options),
            client: SimulatedClient::new(),
            script: None,
            value: None,
            output: None,
        }
    }

    /// Installs `script` and performs the initial run.
    pub fn set_script(
        &mut self,
        script: impl FnMut(&mut ScriptRunContext<'_>) -> Result<R, WidgetError> + 'static,
    ) -> Result<(), TestRuleError> {
        self.script = Some(Box::new(script));
        self.run()
    }

    /// Reruns the script with whatever the client has queued, if anything.
    pub fn rerun(&mut self) -> Result<(), TestRuleError> {
        self.run()
    }

    /// Clicks button `id` and reruns.
    pub fn click(&mut self, id: &str) -> Result<(), TestRuleError> {
        let batch = self.client.click(id)?;
        self.session.enqueue_client_update(batch);
        self.run()
    }

    /// Clicks the button labelled `label` and reruns.
    pub fn click_button(&mut self, label: &str) -> Result<(), TestRuleError> {
        let id = self.id_of(WidgetKind::Button, label)?;
        self.click(&id)
    }

    /// Changes widget `id`. Reruns unless the widget is inside a form, in
    /// which case the edit waits for the form's submit.
    pub fn set_value(&mut self, id: &str, value: WidgetValue) -> Result<(), TestRuleError> {
        match self.client.edit(id, value)? {
            Some(batch) => {
                self.session.enqueue_client_update(batch);
                self.run()
            }
            None => Ok(()),
        }
    }

    /// Clicks the submit button of `form_id` and reruns.
    pub fn submit_form(&mut self, form_id: &str) -> Result<(), TestRuleError> {
        let id = self
            .client
            .submit_button(form_id)
            .map(|d| d.id.as_str().to_owned())
            .ok_or_else(|| TestRuleError::NoSubmitButton {
                form_id: form_id.to_owned(),
            })?;
        self.click(&id)
    }

    /// Queues a raw batch without rerunning, as a transport would when
    /// messages arrive faster than runs complete.
    pub fn send(&mut self, batch: WidgetStates) {
        self.session.enqueue_client_update(batch);
    }

    /// What the last successful run returned.
    pub fn value(&self) -> Option<&R> {
        self.value.as_ref()
    }

    pub fn output(&self) -> Option<&RunOutput> {
        self.output.as_ref()
    }

    pub fn declarations(&self) -> &[WidgetDeclaration] {
        self.client.declarations()
    }

    pub fn find(&self, kind: WidgetKind, label: &str) -> Option<&WidgetDeclaration> {
        self.client.find(kind, label)
    }

    /// ID of the widget of `kind` labelled `label` in the last run.
    pub fn id_of(&self, kind: WidgetKind, label: &str) -> Result<String, TestRuleError> {
        self.find(kind, label)
            .map(|d| d.id.as_str().to_owned())
            .ok_or_else(|| TestRuleError::UnknownWidget(format!("{kind} '{label}'")))
    }

    pub fn client(&self) -> &SimulatedClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&mut self) -> SessionStateProxy<'_> {
        self.session.session_state()
    }

    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    fn run(&mut self) -> Result<(), TestRuleError> {
        let script = self.script.as_mut().ok_or(TestRuleError::NoScript)?;
        let (value, output) = self.session.run(|ctx| script(ctx))?;
        log::debug!(
            "test rule: run {} declared {} widgets",
            output.run_id,
            output.declarations.len()
        );
        self.client.apply(&output);
        self.value = Some(value);
        self.output = Some(output);
        Ok(())
    }
}

impl<R> Default for ScriptTestRule<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `ScriptTestRule`.
pub fn run_test_script<R, T>(f: impl FnOnce(&mut ScriptTestRule<R>) -> T) -> T {
    let mut rule = ScriptTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod client_tests;
