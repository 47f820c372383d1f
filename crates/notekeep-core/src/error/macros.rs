//! Error macros for notekeep

/// Macro for returning a validation error for a named field
#[macro_export]
macro_rules! bail_validation {
    ($field:expr, $reason:expr) => {
        return Err($crate::error::NotekeepError::validation($field, $reason))
    };
}

/// Macro for mapping database errors
#[macro_export]
macro_rules! map_db_err {
    ($op:expr, $error:expr) => {
        $crate::error::NotekeepError::db_operation($op, $error)
    };
}
