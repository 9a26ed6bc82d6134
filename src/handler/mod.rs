//! Request handler module
//!
//! Responsible for request routing dispatch and page rendering: the sitemap
//! driven home listing and single markdown documents.

pub mod document;
pub mod home;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
