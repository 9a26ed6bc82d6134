//! HTTP protocol layer module
//!
//! Conditional-request helpers and response builders, independent of how pages are produced.

pub mod cache;
pub mod response;

// Re-export commonly used types
pub use cache::{check_etag_match, generate_etag};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_error_response,
    build_page_response,
};
