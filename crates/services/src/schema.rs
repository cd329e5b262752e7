//! # Rule Evaluator
//!
//! A declarative, short-circuiting validation engine. Callers build an
//! ordered list of [`Rule`]s; [`check_schema`] walks it in declared order,
//! skipping rules whose named permission the actor holds, aggregating
//! non-blocking violations and halting on the first blocking one.
//!
//! Synchronous and asynchronous predicates share one awaited-result contract,
//! so ordering semantics are identical regardless of predicate cost. Rule
//! order is part of the contract: cheap structural rules must block before
//! any deferred lookup is attempted.

use domains::error::StoreError;
use domains::permissions::{Permission, PermissionSet};
use futures_util::future::BoxFuture;

/// A predicate, either already computed or awaiting evaluation.
///
/// Deferred checks that are never reached (permission skip, or an earlier
/// blocking failure) are dropped unpolled.
pub enum Check<'a> {
    Immediate(bool),
    Deferred(BoxFuture<'a, Result<bool, StoreError>>),
}

/// One entry in the declarative rule list.
pub struct Rule<'a> {
    pub check: Check<'a>,
    pub expected: bool,
    /// When set and held by the actor, the rule is skipped entirely: the
    /// predicate is not evaluated and no error is recorded.
    pub permission: Option<Permission>,
    pub blocking: bool,
    pub message: String,
}

impl<'a> Rule<'a> {
    pub fn immediate(result: bool, expected: bool, message: impl Into<String>) -> Self {
        Self {
            check: Check::Immediate(result),
            expected,
            permission: None,
            blocking: false,
            message: message.into(),
        }
    }

    pub fn deferred(
        future: BoxFuture<'a, Result<bool, StoreError>>,
        expected: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: Check::Deferred(future),
            expected,
            permission: None,
            blocking: false,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    #[must_use]
    pub fn skip_for(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

/// True when `len` falls outside `[min, max]`. Mirrors how the rules express
/// length constraints: the violation is the out-of-range case, paired with
/// `expected: false`.
pub fn length_out_of(len: usize, min: usize, max: usize) -> bool {
    len < min || len > max
}

/// Length of an optional string field, absent counting as zero.
pub fn field_len(field: Option<&str>) -> usize {
    field.map(str::chars).map(Iterator::count).unwrap_or(0)
}

/// Evaluate `rules` in order against the actor's `permissions`.
///
/// Returns the violation messages: empty means valid; a blocking violation
/// returns exactly that one message and nothing after it runs. Store failures
/// from deferred predicates abort evaluation and propagate.
pub async fn check_schema(
    rules: Vec<Rule<'_>>,
    permissions: &PermissionSet,
) -> Result<Vec<String>, StoreError> {
    let mut errors = Vec::new();
    for rule in rules {
        if let Some(permission) = rule.permission {
            if permissions.has(permission) {
                continue;
            }
        }
        let value = match rule.check {
            Check::Immediate(value) => value,
            Check::Deferred(future) => future.await?,
        };
        if value != rule.expected {
            if rule.blocking {
                return Ok(vec![rule.message]);
            }
            errors.push(rule.message);
        }
    }
    Ok(errors)
}
