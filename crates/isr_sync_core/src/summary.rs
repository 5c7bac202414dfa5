use crate::contract::ReconcileOutcome;

/// Builds the variable-sync portion of the status message. `None` means the
/// request carried no variables section at all.
pub fn variable_summary(outcomes: Option<&[ReconcileOutcome]>) -> String {
    match outcomes {
        Some(outcomes) => {
            let success_count = outcomes.iter().filter(|outcome| outcome.succeeded).count();
            let fail_count = outcomes.len() - success_count;
            format!(
                "Updated/Created {success_count} environment variables successfully across all environments. {fail_count} failed. "
            )
        }
        None => "No environment variables were updated or created. ".to_string(),
    }
}

/// Builds the revalidation portion of the status message. `None` means no
/// revalidation call was dispatched.
pub fn revalidation_summary(dispatched_pages: Option<usize>) -> String {
    match dispatched_pages {
        Some(count) => format!("Revalidation request sent for {count} pages."),
        None => "No pages were revalidated.".to_string(),
    }
}
