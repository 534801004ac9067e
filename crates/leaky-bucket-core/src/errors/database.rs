// ABOUTME: Conversion of sqlx storage errors into the application error taxonomy
// ABOUTME: Unique-constraint violations become conflicts, everything else a database fault
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{AppError, ErrorCode};

/// Whether a sqlx error is a unique-constraint violation
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => {
                Self::new(ErrorCode::ResourceNotFound, "Row not found").with_source(error)
            }
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                let message = db_error.message().to_owned();
                Self::new(ErrorCode::ResourceAlreadyExists, message).with_source(error)
            }
            _ => Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error),
        }
    }
}
