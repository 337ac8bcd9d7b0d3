//! Choice unification
//!
//! Alternatives are tried in declared order and the first success wins.
//! Every attempt runs against a snapshot of the binding store: a failed
//! alternative restores the snapshot so its partial bindings cannot leak
//! into the next attempt. The fresh-id counter is never rolled back, ids
//! stay unique across discarded legs.

use log::trace;

use crate::error::{TypeError, TypeResult};
use crate::span::Span;
use crate::types::Type;
use crate::unifier::Unifier;

impl Unifier {
    /// Unify a choice's alternatives against `other`, committing to the
    /// first one that fits.
    ///
    /// When `other` is itself a choice the recursion fans out over its
    /// alternatives, which yields every pair in declared order. Exhaustion
    /// reports one aggregate error naming `other` and everything tried.
    pub(super) fn unify_choice(
        &mut self,
        alternatives: &[Type],
        other: &Type,
        span: Span,
        depth: usize,
    ) -> TypeResult<()> {
        for (index, alternative) in alternatives.iter().enumerate() {
            trace!("choice alternative {index}: {alternative} ~ {other}");
            let snapshot = self.snapshot();
            match self.unify_at(alternative, other, span, depth + 1) {
                Ok(()) => return Ok(()),
                Err(_) => self.restore(snapshot),
            }
        }
        Err(TypeError::ChoiceExhausted {
            choice: Type::Choice(alternatives.to_vec()),
            target: other.clone(),
            span,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
