//! Headless harness for driving Reprise scripts through simulated client
//! interactions.

mod client;
mod error;
mod testing;

pub use client::SimulatedClient;
pub use error::TestRuleError;
pub use testing::{run_test_script, ScriptTestRule};
