use vt_core::errors::WorkflowError;
use vt_db::error::DatabaseError;

/// Storage, configuration and usage failures.
pub const FAILED: i32 = 1;
/// The workflow refused the operation; nothing was written.
pub const REJECTED: i32 = 2;

fn database_error(error: &anyhow::Error) -> Option<&DatabaseError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DatabaseError>())
}

/// Process exit status for a failed command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    if database_error(error).is_some_and(DatabaseError::is_workflow_rejection) {
        REJECTED
    } else {
        FAILED
    }
}

/// Print the error to stderr, tagged with the rejection code when there is one.
pub fn report(error: &anyhow::Error) {
    match rejection_code(error) {
        Some(code) => eprintln!("vt error [{code}]: {error:#}"),
        None => eprintln!("vt error: {error:#}"),
    }
    let reread = database_error(error)
        .and_then(DatabaseError::workflow)
        .is_some_and(WorkflowError::requires_reread);
    if reread {
        eprintln!("hint: another writer got there first; re-read the movement and retry");
    }
}

/// Stable code of the workflow rejection behind an error, if any.
pub fn rejection_code(error: &anyhow::Error) -> Option<&'static str> {
    database_error(error)
        .and_then(DatabaseError::workflow)
        .map(WorkflowError::code)
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use pretty_assertions::assert_eq;
    use vt_core::enums::EntityType;
    use vt_core::errors::WorkflowError;
    use vt_db::error::DatabaseError;

    use super::{FAILED, REJECTED, exit_code, rejection_code};

    fn rejected() -> anyhow::Error {
        DatabaseError::from(WorkflowError::not_found(EntityType::Movement, "mov-1")).into()
    }

    #[test]
    fn workflow_rejection_exits_with_distinct_status() {
        let error = rejected();
        assert_eq!(exit_code(&error), REJECTED);
        assert_eq!(rejection_code(&error), Some("not_found"));
    }

    #[test]
    fn rejection_is_found_under_context() {
        let error = Err::<(), _>(rejected())
            .context("failed to close movement")
            .expect_err("should fail");
        assert_eq!(exit_code(&error), REJECTED);
        assert_eq!(rejection_code(&error), Some("not_found"));
    }

    #[test]
    fn storage_and_usage_failures_exit_with_one() {
        let storage: anyhow::Error = DatabaseError::NoResult.into();
        assert_eq!(exit_code(&storage), FAILED);
        assert_eq!(rejection_code(&storage), None);

        let usage = anyhow::anyhow!("At least one of --intake-date must be provided");
        assert_eq!(exit_code(&usage), FAILED);
    }
}
