//! Unification engine for the Vela type system
//!
//! One [`Unifier`] per compilation session owns:
//! - the binding store mapping variable ids to their bindings
//! - the fresh-variable counter (strictly decreasing negative ids)
//! - the configured recursion limit
//!
//! Bindings are monotonic: a bound variable is never silently rebound.
//! Re-instantiating degrades to unifying the existing binding against the
//! candidate; [`Unifier::unbind`] is the only path that clears a binding
//! and exists for backtracking hosts. Sessions are independent, so
//! parallel compilation units each own their `Unifier` with no locking.

use std::collections::HashMap;

use log::debug;

use crate::config::UnifierConfig;
use crate::types::{Type, TypeVar, VarId};

mod choice;
mod instantiate;
mod unify;

/// Copy of the binding store, taken before a choice alternative runs and
/// restored if the alternative fails.
pub(crate) type Snapshot = HashMap<VarId, Option<Type>>;

// ============================================================================
// Unifier
// ============================================================================

/// Per-session unification state
#[derive(Debug, Clone)]
pub struct Unifier {
    /// Variable id -> binding. A `None` value marks a variable that was
    /// seen and later unbound; a missing key was never referenced.
    bindings: HashMap<VarId, Option<Type>>,
    /// Next fresh id; starts at -1 and only decreases, ids are never reused
    next_fresh: VarId,
    config: UnifierConfig,
}

impl Unifier {
    pub fn new() -> Self {
        Self::with_config(UnifierConfig::default())
    }

    pub fn with_config(config: UnifierConfig) -> Self {
        Unifier {
            bindings: HashMap::new(),
            next_fresh: -1,
            config,
        }
    }

    pub fn config(&self) -> &UnifierConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Store primitives
    // ------------------------------------------------------------------

    /// Mint a fresh, unconstrained variable with the next negative id.
    pub fn fresh_var(&mut self) -> TypeVar {
        let id = self.next_fresh;
        self.next_fresh -= 1;
        TypeVar::new(id)
    }

    /// Mint a fresh variable carrying a constraint.
    pub fn fresh_var_with_constraint(&mut self, constraint: Type) -> TypeVar {
        let mut var = self.fresh_var();
        var.constraint = Some(Box::new(constraint));
        var
    }

    /// Record a binding. Callers run the occurs check first, so the
    /// target never reaches back to the variable being bound.
    pub(crate) fn bind(&mut self, var: &TypeVar, ty: Type) {
        debug_assert!(
            !ty.contains_var(var.id),
            "cyclic binding for v{}",
            var.id
        );
        debug!("bind v{} --> {}", var.id, ty);
        self.bindings.insert(var.id, Some(ty));
    }

    /// Clear a binding while keeping the variable marked as seen; no-op
    /// for ids that were never referenced. Backtracking hosts only, the
    /// algorithm itself rolls back through store snapshots.
    pub fn unbind(&mut self, var: &TypeVar) {
        if let Some(slot) = self.bindings.get_mut(&var.id) {
            debug!("unbind v{}", var.id);
            *slot = None;
        }
    }

    /// Current binding of an id, if any.
    pub fn lookup(&self, id: VarId) -> Option<&Type> {
        self.bindings.get(&id).and_then(|slot| slot.as_ref())
    }

    /// Whether the store has ever referenced this id, bound or not.
    pub fn was_seen(&self, id: VarId) -> bool {
        self.bindings.contains_key(&id)
    }

    /// Number of store entries, unbound ones included.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Store entries in arbitrary order; consumers sort as needed.
    pub fn bindings(&self) -> impl Iterator<Item = (VarId, Option<&Type>)> + '_ {
        self.bindings.iter().map(|(id, slot)| (*id, slot.as_ref()))
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.bindings.clone()
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.bindings = snapshot;
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Follow a variable's binding chain to its end.
    ///
    /// Returns the final non-variable type, or `None` while the chain
    /// still ends in a free variable.
    pub fn resolve(&self, id: VarId) -> Option<Type> {
        let mut current = self.lookup(id)?;
        loop {
            match current {
                Type::Var(next) => current = self.lookup(next.id)?,
                concrete => return Some(concrete.clone()),
            }
        }
    }

    /// Deep copy of `ty` with every variable that resolves replaced by its
    /// resolution; free variables are kept as-is. Quantified bodies are
    /// left untouched: they are opened before any of their variables can
    /// be bound.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => match self.lookup(v.id) {
                Some(bound) => self.apply(bound),
                None => ty.clone(),
            },
            Type::Primitive(_)
            | Type::Int { .. }
            | Type::AnyInt(_)
            | Type::Float { .. }
            | Type::TypeName(_)
            | Type::Polymorphic { .. } => ty.clone(),
            Type::Array(element) => Type::array(self.apply(element)),
            Type::Tuple(elements) => {
                Type::Tuple(elements.iter().map(|e| self.apply(e)).collect())
            }
            Type::Function { params, result } => {
                Type::function(self.apply(params), self.apply(result))
            }
            Type::Choice(alternatives) => {
                Type::Choice(alternatives.iter().map(|a| self.apply(a)).collect())
            }
        }
    }
}

impl Default for Unifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
