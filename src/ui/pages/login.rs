//! Portal login page

use anyhow::Result;
use thirtyfour::By;

use crate::check::CheckPoint;
use crate::ui::actions::BaseActions;
use crate::ui::page::BasePage;

const USER_FIELD: &str = "input#username";
const PASSWORD_FIELD: &str = "input#password";
const SIGN_IN_BUTTON: &str = "button[type='submit']";

/// Title shown on the landing page after a successful login
const DASHBOARD_TITLE: &str = "Dashboard";

/// Page object for the portal login form
pub struct LoginPage {
    base: BasePage,
}

impl LoginPage {
    pub fn new(actions: BaseActions) -> Self {
        Self {
            base: BasePage::new(actions),
        }
    }

    /// Open the portal and submit the login form
    pub async fn login(&self, portal_url: &str, user: &str, password: &str) -> Result<()> {
        self.base.actions.navigate(portal_url).await?;
        self.base
            .actions
            .type_into(By::Css(USER_FIELD), user)
            .await?;
        self.base
            .actions
            .type_into(By::Css(PASSWORD_FIELD), password)
            .await?;
        self.base.actions.click(By::Css(SIGN_IN_BUTTON)).await
    }

    /// Verify the landing page, marking the checkpoint and capturing a
    /// screenshot on failure.
    pub async fn verify_login(&self, checkpoint: &mut CheckPoint) -> Result<()> {
        let ok = self.base.verify_title(DASHBOARD_TITLE).await;
        checkpoint.mark(ok, "login landed on the dashboard");
        if !ok {
            self.base
                .actions
                .screenshot("login landed on the dashboard")
                .await?;
        }
        Ok(())
    }
}
