/// Atlassian-related transformations (Jira)
///
/// This module contains pure transformation functions for Jira webhook data.
/// All functions are free of I/O operations and testable with fixture data.
pub mod jira;
