//! stratoqa - test automation suite for the Strato cloud platform
//!
//! Thin REST clients for each platform service (identity, compute,
//! network, image, orchestration), a bounded state-polling helper, a
//! pass/fail checkpoint accumulator, and a WebDriver page-object
//! framework. Workflow scenarios live under `tests/`.
//!
//! # Example
//!
//! ```ignore
//! use stratoqa::api::client::ApiClient;
//! use stratoqa::compute::Flavors;
//! use stratoqa::config::Config;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = Config::load();
//!     let client = ApiClient::project_scoped(&config, "qa-project")?;
//!     let flavors = Flavors::new(client, "project-id");
//!     let flavor_id = flavors.best_match(2, 2048).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod check;
pub mod compute;
pub mod config;
pub mod identity;
pub mod image;
pub mod network;
pub mod orgs;
pub mod poll;
pub mod ui;

/// Generate a unique resource name with the given prefix. Scenarios use
/// this so parallel runs against one deployment never collide.
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_differ() {
        let a = unique_name("qa-bu");
        let b = unique_name("qa-bu");
        assert!(a.starts_with("qa-bu-"));
        assert_ne!(a, b);
    }
}
