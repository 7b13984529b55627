//! Browser UI automation
//!
//! Page-object framework over a WebDriver session:
//!
//! - [`actions`] - base driver actions (navigate, find-with-wait, input,
//!   screenshots)
//! - [`page`] - behaviors common to every page
//! - [`pages`] - concrete page objects for the portal

pub mod actions;
pub mod page;
pub mod pages;
