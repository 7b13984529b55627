//! Page objects for the Strato portal

pub mod login;
