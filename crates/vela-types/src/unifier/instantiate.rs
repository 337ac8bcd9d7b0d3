//! Opening polymorphic types
//!
//! `forall v. T` never unifies as-is; each use site opens the quantifier
//! by substituting a freshly minted variable for `v` throughout a
//! structural copy of `T`. Every opening gets its own variable, so
//! distinct uses of one polymorphic type instantiate independently.

use log::trace;

use crate::types::{Type, TypeVar, VarId};
use crate::unifier::Unifier;

impl Unifier {
    /// Open `forall bound. body`: a structural copy of `body` with every
    /// occurrence of the bound variable replaced by a fresh one. The fresh
    /// variable inherits the quantifier's constraint. The store is not
    /// touched; only the fresh-id counter advances.
    pub(super) fn open_polymorphic(&mut self, bound: &TypeVar, body: &Type) -> Type {
        let mut fresh = self.fresh_var();
        fresh.constraint = bound.constraint.clone();
        trace!("open forall v{} with v{}", bound.id, fresh.id);
        substitute(body, bound.id, &fresh)
    }
}

/// Structural copy with occurrences of `target` replaced by `fresh`.
///
/// Occurrences inside other variables' constraints are substituted too.
/// A nested quantifier over the same id shadows the outer binding and is
/// copied untouched.
fn substitute(ty: &Type, target: VarId, fresh: &TypeVar) -> Type {
    match ty {
        Type::Var(v) if v.id == target => Type::Var(fresh.clone()),
        Type::Var(v) => match &v.constraint {
            Some(constraint) => Type::Var(TypeVar {
                id: v.id,
                constraint: Some(Box::new(substitute(constraint, target, fresh))),
            }),
            None => ty.clone(),
        },
        Type::Primitive(_)
        | Type::Int { .. }
        | Type::AnyInt(_)
        | Type::Float { .. }
        | Type::TypeName(_) => ty.clone(),
        Type::Array(element) => Type::array(substitute(element, target, fresh)),
        Type::Tuple(elements) => Type::Tuple(
            elements
                .iter()
                .map(|e| substitute(e, target, fresh))
                .collect(),
        ),
        Type::Function { params, result } => Type::function(
            substitute(params, target, fresh),
            substitute(result, target, fresh),
        ),
        Type::Choice(alternatives) => Type::Choice(
            alternatives
                .iter()
                .map(|a| substitute(a, target, fresh))
                .collect(),
        ),
        Type::Polymorphic { bound, body } => {
            if bound.id == target {
                ty.clone()
            } else {
                Type::Polymorphic {
                    bound: bound.clone(),
                    body: Box::new(substitute(body, target, fresh)),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
