//! Conditions driving automatic transitions.
//!
//! A condition is a boolean predicate over the machine's owner. Conditions
//! are evaluated once per tick while their rule is a candidate; they should
//! only observe the owner, never mutate it.

use std::fmt;

/// Predicate over the owner that decides whether a rule fires.
///
/// # Example
///
/// ```rust
/// use tickwise::core::Condition;
///
/// struct Character {
///     speed: f32,
/// }
///
/// let moving = Condition::new(|c: &Character| c.speed > 0.0);
///
/// assert!(moving.check(&Character { speed: 2.0 }));
/// assert!(!moving.check(&Character { speed: 0.0 }));
/// ```
pub struct Condition<O> {
    predicate: Box<dyn Fn(&O) -> bool>,
}

impl<O> Condition<O> {
    /// Create a condition from a predicate over the owner.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&O) -> bool + 'static,
    {
        Condition {
            predicate: Box::new(predicate),
        }
    }

    /// Condition that always holds.
    pub fn always() -> Self
    where
        O: 'static,
    {
        Condition::new(|_| true)
    }

    /// Evaluate the condition against the owner.
    pub fn check(&self, owner: &O) -> bool {
        (self.predicate)(owner)
    }

    /// Logical negation of this condition.
    pub fn not(self) -> Self
    where
        O: 'static,
    {
        Condition::new(move |o| !self.check(o))
    }

    /// Logical conjunction, short-circuiting on `self`.
    pub fn and(self, other: Self) -> Self
    where
        O: 'static,
    {
        Condition::new(move |o| self.check(o) && other.check(o))
    }

    /// Logical disjunction, short-circuiting on `self`.
    pub fn or(self, other: Self) -> Self
    where
        O: 'static,
    {
        Condition::new(move |o| self.check(o) || other.check(o))
    }
}

impl<O> fmt::Debug for Condition<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}
