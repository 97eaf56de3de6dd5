//! Domain-specific assertion macros for snatch harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! record or page property was violated.

/// Assert that a page layout renders to the expected window string.
///
/// ```rust
/// assert_window!(compute_window(7, 500, 50), "1 … 5 6 7 8 9 10");
/// ```
#[macro_export]
macro_rules! assert_window {
    ($layout:expr, $expected:expr) => {{
        let layout: snatch_core::pagination::PageLayout = $layout;
        pretty_assertions::assert_eq!(
            layout.window.to_string(),
            $expected,
            "window for page {} of {} ({} results)",
            layout.current,
            layout.total_pages,
            layout.total_results
        );
    }};
}

/// Assert that a result set holds exactly the credential ids given, in order.
#[macro_export]
macro_rules! assert_credential_ids {
    ($set:expr, [$($id:expr),* $(,)?]) => {{
        match $set {
            snatch_core::ResultSet::Credentials(page) => {
                let ids: Vec<i64> = page.records.iter().map(|c| c.id).collect();
                pretty_assertions::assert_eq!(ids, vec![$($id),*], "credential ids on page {}", page.page);
            }
            other => panic!("expected credentials, got {:?}", other.entity()),
        }
    }};
}

/// Assert that a result set holds exactly the system ids given, in order.
#[macro_export]
macro_rules! assert_system_ids {
    ($set:expr, [$($id:expr),* $(,)?]) => {{
        match $set {
            snatch_core::ResultSet::Systems(page) => {
                let ids: Vec<i64> = page.records.iter().map(|s| s.id).collect();
                pretty_assertions::assert_eq!(ids, vec![$($id),*], "system ids on page {}", page.page);
            }
            other => panic!("expected systems, got {:?}", other.entity()),
        }
    }};
}
