//! Base page behaviors

use super::actions::BaseActions;

/// Behaviors common to every page object
#[derive(Clone)]
pub struct BasePage {
    pub actions: BaseActions,
}

impl BasePage {
    pub fn new(actions: BaseActions) -> Self {
        Self { actions }
    }

    /// Verify the page title contains the expected text.
    ///
    /// Returns `false` (after logging) rather than erroring, so page
    /// objects can feed the result straight into a checkpoint mark.
    pub async fn verify_title(&self, expected: &str) -> bool {
        match self.actions.title().await {
            Ok(actual) => {
                let matches = actual.contains(expected);
                if !matches {
                    tracing::error!("page title {:?} does not contain {:?}", actual, expected);
                }
                matches
            }
            Err(err) => {
                tracing::error!("failed to get page title: {}", err);
                false
            }
        }
    }
}
