use reprise_core::WidgetError;

/// Failures of a scripted interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestRuleError {
    /// No script was installed before running.
    NoScript,
    /// The last run declared nothing with this ID or label.
    UnknownWidget(String),
    /// Only buttons can be clicked.
    NotClickable(String),
    /// The form has no submit button in the last run.
    NoSubmitButton { form_id: String },
    /// The script (or a callback before it) failed.
    Script(WidgetError),
}

impl std::fmt::Display for TestRuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestRuleError::NoScript => write!(f, "no script installed; call set_script first"),
            TestRuleError::UnknownWidget(id) => {
                write!(f, "the last run declared no widget '{id}'")
            }
            TestRuleError::NotClickable(id) => write!(f, "widget '{id}' is not a button"),
            TestRuleError::NoSubmitButton { form_id } => {
                write!(f, "form '{form_id}' has no submit button")
            }
            TestRuleError::Script(err) => write!(f, "script failed: {err}"),
        }
    }
}

impl std::error::Error for TestRuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TestRuleError::Script(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WidgetError> for TestRuleError {
    fn from(err: WidgetError) -> Self {
        TestRuleError::Script(err)
    }
}
