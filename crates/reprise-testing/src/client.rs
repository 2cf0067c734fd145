use crate::error::TestRuleError;
use reprise_core::{
    RunOutput, StateRecord, WidgetDeclaration, WidgetId, WidgetKind, WidgetStates, WidgetValue,
};
use std::collections::BTreeMap;

/// Plays the browser's part: remembers what the user entered and what the
/// server forced, and turns interactions into state batches.
///
/// Every batch is a full snapshot of the values the client holds. Edits to
/// widgets inside a form stay local until the form is submitted. Clicks are
/// sent once and then forgotten.
#[derive(Clone, Debug, Default)]
pub struct SimulatedClient {
    declarations: Vec<WidgetDeclaration>,
    values: BTreeMap<WidgetId, WidgetValue>,
    form_edits: BTreeMap<String, BTreeMap<WidgetId, WidgetValue>>,
}

impl SimulatedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders a finished run: overrides replace what the user entered and
    /// widgets the run didn't declare disappear.
    pub fn apply(&mut self, output: &RunOutput) {
        self.declarations = output.declarations.clone();
        let live = |id: &WidgetId| self.declarations.iter().any(|d| &d.id == id);
        self.values.retain(|id, _| live(id));
        for edits in self.form_edits.values_mut() {
            edits.retain(|id, _| live(id));
        }
        self.form_edits
            .retain(|form_id, _| self.declarations.iter().any(|d| &d.form_id == form_id));

        for declaration in &self.declarations {
            if let (true, Some(value)) = (declaration.value_set, declaration.value.as_ref()) {
                log::trace!("client: {} overridden with {value:?}", declaration.id);
                self.values.insert(declaration.id.clone(), value.clone());
                if let Some(edits) = self.form_edits.get_mut(&declaration.form_id) {
                    edits.remove(&declaration.id);
                }
            }
        }
    }

    pub fn declarations(&self) -> &[WidgetDeclaration] {
        &self.declarations
    }

    pub fn declaration(&self, id: &str) -> Option<&WidgetDeclaration> {
        self.declarations.iter().find(|d| d.id.as_str() == id)
    }

    pub fn find(&self, kind: WidgetKind, label: &str) -> Option<&WidgetDeclaration> {
        self.declarations
            .iter()
            .find(|d| d.kind == kind && d.label() == Some(label))
    }

    /// What the user currently sees in widget `id`.
    pub fn displayed(&self, id: &str) -> Option<&WidgetValue> {
        let declaration = self.declaration(id)?;
        self.form_edits
            .get(&declaration.form_id)
            .and_then(|edits| edits.get(id))
            .or_else(|| self.values.get(id))
            .or(declaration.default.as_ref())
    }

    /// The user changes widget `id`. Returns the batch to send, or `None`
    /// when the widget belongs to a form and the edit is held back.
    pub fn edit(
        &mut self,
        id: &str,
        value: WidgetValue,
    ) -> Result<Option<WidgetStates>, TestRuleError> {
        let declaration = self
            .declaration(id)
            .ok_or_else(|| TestRuleError::UnknownWidget(id.to_owned()))?;
        let id = declaration.id.clone();
        if declaration.form_id.is_empty() {
            self.values.insert(id, value);
            return Ok(Some(self.snapshot()));
        }
        let form_id = declaration.form_id.clone();
        log::trace!("client: holding edit of {id} in form '{form_id}'");
        self.form_edits.entry(form_id).or_default().insert(id, value);
        Ok(None)
    }

    /// The user clicks button `id`. A submit button first releases the
    /// edits held in its form.
    pub fn click(&mut self, id: &str) -> Result<WidgetStates, TestRuleError> {
        let declaration = self
            .declaration(id)
            .ok_or_else(|| TestRuleError::UnknownWidget(id.to_owned()))?;
        if declaration.kind != WidgetKind::Button {
            return Err(TestRuleError::NotClickable(id.to_owned()));
        }
        let id = declaration.id.clone();
        if declaration.is_form_submitter() {
            let form_id = declaration.form_id.clone();
            if let Some(edits) = self.form_edits.remove(&form_id) {
                self.values.extend(edits);
            }
        }
        let mut batch = self.snapshot();
        batch.push(StateRecord::trigger(id, true));
        Ok(batch)
    }

    /// Submit button of `form_id` in the last run.
    pub fn submit_button(&self, form_id: &str) -> Option<&WidgetDeclaration> {
        self.declarations
            .iter()
            .find(|d| d.form_id == form_id && d.is_form_submitter())
    }

    /// Everything the client holds, ordered by widget ID.
    pub fn snapshot(&self) -> WidgetStates {
        self.values
            .iter()
            .map(|(id, value)| StateRecord::new(id.clone(), value.clone()))
            .collect()
    }
}
