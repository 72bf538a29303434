/// Router Module Index
///
/// Organizes the application's routing surface into the two kinds of routes
/// the access gate distinguishes. The gate itself is layered over both in
/// `create_router`; the split here mirrors how requests are classified rather
/// than granting any access by placement.

/// HTML page routes (landing, auth pages, dashboard, upload forms).
pub mod pages;

/// JSON/multipart API routes consumed by the pages.
pub mod api;
