//! Interaction configuration: attribute plumbing, panel operations, and
//! download payload derivation.

pub mod apply;
pub mod download;
pub mod panel;

pub use apply::{clear_interaction, read_element_interaction, write_interaction};
pub use download::DownloadPayload;
