/// Tools Module
///
/// Each tool lives in its own module and exports a `register` function that
/// adds its definition and handler to the registry during server startup.

mod args;
pub mod lookup;
pub mod search;

/// Closing line of a successful lookup.
pub const LOOKUP_DISCLAIMER: &str =
    "*Note: This is a reference tool. Verify all codes with official sources before use.*";

/// Closing line of a non-empty search result.
pub const SEARCH_DISCLAIMER: &str =
    "*Note: This is a sample database. Use official sources for complete code information.*";
