// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wait budgets for store calls.
//!
//! The store call runs in its own task. When the budget runs out the caller
//! gets `Timeout`, but the task keeps going and its write may still land.

use crate::error::{AppError, Result};
use std::future::Future;
use std::time::Duration;

/// Await `fut` for at most `budget`.
///
/// `what` names the operation in the timeout message.
pub async fn within<F, T>(budget: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(fut);

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(AppError::Internal(anyhow::anyhow!(
            "{} task failed: {}",
            what,
            join_err
        ))),
        Err(_) => {
            tracing::warn!(
                operation = what,
                budget_ms = budget.as_millis() as u64,
                "Stopped waiting for store call; it may still complete"
            );
            Err(AppError::Timeout(format!(
                "{} did not finish within {}s",
                what,
                budget.as_secs_f32()
            )))
        }
    }
}
