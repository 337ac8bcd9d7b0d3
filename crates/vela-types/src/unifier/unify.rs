//! Core unification dispatch
//!
//! Fixed precedence over the operand shapes: variables first, then
//! choices, then quantifiers, then the structural types, then generic
//! integers, and finally plain equality. Both sides are checked for the
//! special shapes before any structural rule can reject them, so swapping
//! the operands never changes whether unification succeeds.

use crate::error::{Position, TypeError, TypeResult};
use crate::span::Span;
use crate::types::{Type, TypeVar, VarId};
use crate::unifier::Unifier;

fn mismatch(expected: &Type, found: &Type, span: Span) -> TypeError {
    TypeError::Mismatch {
        expected: expected.clone(),
        found: found.clone(),
        span,
    }
}

impl Unifier {
    /// Unify two types, recording variable bindings in the session store.
    ///
    /// On failure the store may retain bindings made by inner successes;
    /// only choice alternatives roll back. Callers that need all-or-nothing
    /// behavior can snapshot via [`Unifier::clone`] before the call.
    pub fn unify(&mut self, a: &Type, b: &Type, span: Span) -> TypeResult<()> {
        self.unify_at(a, b, span, 0)
    }

    pub(super) fn unify_at(
        &mut self,
        a: &Type,
        b: &Type,
        span: Span,
        depth: usize,
    ) -> TypeResult<()> {
        let limit = self.config().effective_max_depth();
        if depth >= limit {
            return Err(TypeError::DepthExceeded { limit, span });
        }

        match (a, b) {
            (Type::Var(var_a), Type::Var(var_b)) => self.unify_vars(var_a, var_b, span, depth),
            (Type::Var(var), _) => self.instantiate_var(var, b, span, depth),
            (_, Type::Var(var)) => self.instantiate_var(var, a, span, depth),

            (Type::Choice(alternatives), _) => self.unify_choice(alternatives, b, span, depth),
            (_, Type::Choice(alternatives)) => self.unify_choice(alternatives, a, span, depth),

            (Type::Polymorphic { .. }, Type::Polymorphic { .. }) => Err(TypeError::Unsupported {
                left: a.clone(),
                right: b.clone(),
                span,
            }),
            (Type::Polymorphic { bound, body }, _) => {
                let opened = self.open_polymorphic(bound, body);
                self.unify_at(&opened, b, span, depth + 1)
            }
            (_, Type::Polymorphic { bound, body }) => {
                let opened = self.open_polymorphic(bound, body);
                self.unify_at(a, &opened, span, depth + 1)
            }

            (Type::Array(elem_a), Type::Array(elem_b)) => self
                .unify_at(elem_a, elem_b, span, depth + 1)
                .map_err(|err| TypeError::positioned(Position::ArrayElement, err, span)),
            (Type::Tuple(elems_a), Type::Tuple(elems_b)) => {
                if elems_a.len() != elems_b.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: a.clone(),
                        found: b.clone(),
                        expected_len: elems_a.len(),
                        found_len: elems_b.len(),
                        span,
                    });
                }
                for (index, (elem_a, elem_b)) in elems_a.iter().zip(elems_b).enumerate() {
                    self.unify_at(elem_a, elem_b, span, depth + 1).map_err(|err| {
                        TypeError::positioned(Position::TupleElement(index), err, span)
                    })?;
                }
                Ok(())
            }
            (
                Type::Function {
                    params: params_a,
                    result: result_a,
                },
                Type::Function {
                    params: params_b,
                    result: result_b,
                },
            ) => {
                self.unify_at(params_a, params_b, span, depth + 1)
                    .map_err(|err| TypeError::positioned(Position::FunctionParams, err, span))?;
                self.unify_at(result_a, result_b, span, depth + 1)
                    .map_err(|err| TypeError::positioned(Position::FunctionResult, err, span))
            }

            (Type::AnyInt(sign), Type::AnyInt(other_sign))
            | (Type::AnyInt(sign), Type::Int { sign: other_sign, .. }) => {
                if sign == other_sign {
                    Ok(())
                } else {
                    Err(TypeError::SignednessMismatch {
                        left: a.clone(),
                        right: b.clone(),
                        span,
                    })
                }
            }
            (Type::AnyInt(_), _) => Err(mismatch(a, b, span)),
            (Type::Int { sign, .. }, Type::AnyInt(other_sign)) => {
                if sign == other_sign {
                    Ok(())
                } else {
                    Err(TypeError::SignednessMismatch {
                        left: a.clone(),
                        right: b.clone(),
                        span,
                    })
                }
            }
            (_, Type::AnyInt(_)) => Err(mismatch(a, b, span)),

            _ => {
                if a == b {
                    Ok(())
                } else {
                    Err(mismatch(a, b, span))
                }
            }
        }
    }

    /// Merge two variables.
    ///
    /// Bound variables degrade to unifying their binding against the other
    /// variable. When both are free their constraints are merged (one side
    /// adopts, two sides must agree), then the variable with the larger id
    /// is bound to point at the smaller id. The direction is deterministic
    /// and keeps binding chains acyclic; the occurs check still guards the
    /// link because a constraint may mention the other variable.
    fn unify_vars(
        &mut self,
        var_a: &TypeVar,
        var_b: &TypeVar,
        span: Span,
        depth: usize,
    ) -> TypeResult<()> {
        if var_a.id == var_b.id {
            return Ok(());
        }
        if let Some(bound) = self.lookup(var_a.id) {
            let bound = bound.clone();
            return self.unify_at(&bound, &Type::Var(var_b.clone()), span, depth + 1);
        }
        if let Some(bound) = self.lookup(var_b.id) {
            let bound = bound.clone();
            return self.unify_at(&bound, &Type::Var(var_a.clone()), span, depth + 1);
        }

        if let (Some(ca), Some(cb)) = (&var_a.constraint, &var_b.constraint) {
            let ca = ca.as_ref().clone();
            let cb = cb.as_ref().clone();
            if self.unify_at(&ca, &cb, span, depth + 1).is_err() {
                let (var, constraint, found) = if var_a.id > var_b.id {
                    (var_a.id, cb, ca)
                } else {
                    (var_b.id, ca, cb)
                };
                return Err(TypeError::ConstraintViolation {
                    var,
                    constraint,
                    found,
                    span,
                });
            }
        }

        let (from, to) = if var_a.id > var_b.id {
            (var_a, var_b)
        } else {
            (var_b, var_a)
        };
        let target = Type::Var(to.clone());
        // the target constraint may mention `from`, which would cycle the store
        if self.occurs(from.id, &target) {
            return Err(TypeError::InfiniteType {
                var: from.id,
                ty: target,
                span,
            });
        }
        self.bind(from, target);
        Ok(())
    }

    /// Instantiate a free variable with a non-variable candidate.
    ///
    /// The constraint, if any, is checked before anything is recorded; a
    /// failed check binds nothing. An already-bound variable is never
    /// overwritten, the existing binding is unified against the candidate.
    /// A candidate that contains the variable itself fails the occurs
    /// check and binds nothing.
    fn instantiate_var(
        &mut self,
        var: &TypeVar,
        candidate: &Type,
        span: Span,
        depth: usize,
    ) -> TypeResult<()> {
        debug_assert!(!candidate.is_var(), "var-var pairs are merged, not instantiated");

        if let Some(constraint) = &var.constraint {
            let constraint = constraint.as_ref().clone();
            if self.unify_at(&constraint, candidate, span, depth + 1).is_err() {
                return Err(TypeError::ConstraintViolation {
                    var: var.id,
                    constraint,
                    found: candidate.clone(),
                    span,
                });
            }
        }

        if let Some(existing) = self.lookup(var.id) {
            let existing = existing.clone();
            return self.unify_at(&existing, candidate, span, depth + 1);
        }

        // occurs check: a binding like v1 = [v1] would make the store cyclic
        if self.occurs(var.id, candidate) {
            return Err(TypeError::InfiniteType {
                var: var.id,
                ty: candidate.clone(),
                span,
            });
        }

        self.bind(var, candidate.clone());
        Ok(())
    }

    /// Whether `id` occurs anywhere inside `ty`, looking through current
    /// bindings and through the constraints of embedded variables. Run
    /// before every [`Unifier::bind`] so the store never holds a type that
    /// reaches back to the variable being bound.
    fn occurs(&self, id: VarId, ty: &Type) -> bool {
        match ty {
            Type::Var(var) => {
                if var.id == id {
                    return true;
                }
                if let Some(bound) = self.lookup(var.id) {
                    if self.occurs(id, bound) {
                        return true;
                    }
                }
                var.constraint
                    .as_ref()
                    .is_some_and(|constraint| self.occurs(id, constraint))
            }
            Type::Primitive(_)
            | Type::Int { .. }
            | Type::AnyInt(_)
            | Type::Float { .. }
            | Type::TypeName(_) => false,
            Type::Array(element) => self.occurs(id, element),
            Type::Tuple(elements) => elements.iter().any(|element| self.occurs(id, element)),
            Type::Function { params, result } => {
                self.occurs(id, params) || self.occurs(id, result)
            }
            Type::Choice(alternatives) => {
                alternatives.iter().any(|alternative| self.occurs(id, alternative))
            }
            Type::Polymorphic { bound, body } => bound.id == id || self.occurs(id, body),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::config::UnifierConfig;
    use crate::error::{Position, TypeError};
    use crate::span::Span;
    use crate::types::{Sign, Type, TypeVar};
    use crate::unifier::Unifier;

    fn unify(unifier: &mut Unifier, a: &Type, b: &Type) -> Result<(), TypeError> {
        unifier.unify(a, b, Span::dummy())
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    #[test]
    fn test_same_variable_unifies_without_binding() {
        let mut unifier = Unifier::new();
        let v = Type::var(TypeVar::new(1));
        unify(&mut unifier, &v, &v).unwrap();
        assert_eq!(unifier.binding_count(), 0);
    }

    #[test]
    fn test_larger_id_points_at_smaller() {
        let mut unifier = Unifier::new();
        let v1 = TypeVar::new(1);
        let v2 = TypeVar::new(2);
        unify(&mut unifier, &Type::var(v2.clone()), &Type::var(v1.clone())).unwrap();
        assert_eq!(unifier.lookup(2), Some(&Type::var(v1.clone())));
        assert_eq!(unifier.lookup(1), None);

        // same direction regardless of argument order
        let mut unifier = Unifier::new();
        unify(&mut unifier, &Type::var(v1.clone()), &Type::var(v2.clone())).unwrap();
        assert_eq!(unifier.lookup(2), Some(&Type::var(v1)));
    }

    #[test]
    fn test_chain_resolves_after_instantiation() {
        let mut unifier = Unifier::new();
        let v1 = Type::var(TypeVar::new(1));
        let v2 = Type::var(TypeVar::new(2));
        unify(&mut unifier, &v1, &v2).unwrap();
        unify(&mut unifier, &v1, &Type::string()).unwrap();
        assert_eq!(unifier.resolve(2), Some(Type::string()));
    }

    #[test]
    fn test_bound_variable_degrades_to_existing_binding() {
        let mut unifier = Unifier::new();
        let v1 = Type::var(TypeVar::new(1));
        let v2 = Type::var(TypeVar::new(2));
        unify(&mut unifier, &v1, &Type::int(32)).unwrap();
        unify(&mut unifier, &v1, &v2).unwrap();
        assert_eq!(unifier.resolve(2), Some(Type::int(32)));
    }

    #[test]
    fn test_rebinding_checks_against_existing() {
        let mut unifier = Unifier::new();
        let v1 = Type::var(TypeVar::new(1));
        unify(&mut unifier, &v1, &Type::int(32)).unwrap();

        // idempotent re-instantiation
        unify(&mut unifier, &v1, &Type::int(32)).unwrap();
        assert_eq!(unifier.binding_count(), 1);

        // conflicting re-instantiation fails without overwriting
        let err = unify(&mut unifier, &v1, &Type::boolean()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
        assert_eq!(unifier.resolve(1), Some(Type::int(32)));
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    #[test]
    fn test_constraint_admits_matching_candidate() {
        let mut unifier = Unifier::new();
        let constrained = Type::var(TypeVar::with_constraint(
            1,
            Type::choice(vec![Type::string(), Type::int(32)]),
        ));
        unify(&mut unifier, &constrained, &Type::string()).unwrap();
        assert_eq!(unifier.resolve(1), Some(Type::string()));
    }

    #[test]
    fn test_constraint_rejects_and_binds_nothing() {
        let mut unifier = Unifier::new();
        let constrained = Type::var(TypeVar::with_constraint(
            1,
            Type::choice(vec![Type::string(), Type::int(32)]),
        ));
        let err = unify(&mut unifier, &constrained, &Type::boolean()).unwrap_err();
        assert!(matches!(err, TypeError::ConstraintViolation { var: 1, .. }));
        assert_eq!(unifier.lookup(1), None);
        assert!(!unifier.was_seen(1));
    }

    #[test]
    fn test_one_sided_constraint_is_adopted_silently() {
        let mut unifier = Unifier::new();
        let constrained = Type::var(TypeVar::with_constraint(1, Type::string()));
        let free = Type::var(TypeVar::new(2));
        unify(&mut unifier, &constrained, &free).unwrap();
        // only the var-var link is recorded
        assert_eq!(unifier.lookup(2), Some(&Type::var(TypeVar::with_constraint(1, Type::string()))));
    }

    #[test]
    fn test_incompatible_constraints_refuse_to_merge() {
        let mut unifier = Unifier::new();
        let a = Type::var(TypeVar::with_constraint(1, Type::string()));
        let b = Type::var(TypeVar::with_constraint(2, Type::boolean()));
        let err = unify(&mut unifier, &a, &b).unwrap_err();
        assert!(matches!(err, TypeError::ConstraintViolation { var: 2, .. }));
        assert_eq!(unifier.lookup(1), None);
        assert_eq!(unifier.lookup(2), None);
    }

    #[test]
    fn test_compatible_constraints_merge_and_link() {
        let mut unifier = Unifier::new();
        let a = Type::var(TypeVar::with_constraint(1, Type::int(64)));
        let b = Type::var(TypeVar::with_constraint(2, Type::int(64)));
        unify(&mut unifier, &a, &b).unwrap();
        assert!(matches!(unifier.lookup(2), Some(Type::Var(v)) if v.id == 1));
    }

    // ------------------------------------------------------------------
    // Occurs check
    // ------------------------------------------------------------------

    #[test]
    fn test_occurs_check_rejects_self_referential_array() {
        let mut unifier = Unifier::new();
        let v = Type::var(TypeVar::new(1));
        let err = unify(&mut unifier, &v, &Type::array(v.clone())).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { var: 1, .. }));
        assert!(!unifier.was_seen(1));

        // same rejection with the operands swapped
        let err = unify(&mut unifier, &Type::array(v.clone()), &v).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { var: 1, .. }));
    }

    #[test]
    fn test_occurs_check_walks_compound_shapes() {
        let mut unifier = Unifier::new();
        let v = Type::var(TypeVar::new(2));
        let shape = Type::function(
            Type::tuple(vec![Type::int(32), v.clone()]),
            Type::boolean(),
        );
        let err = unify(&mut unifier, &v, &shape).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { var: 2, .. }));
        assert_eq!(unifier.lookup(2), None);
    }

    #[test]
    fn test_occurs_check_reaches_through_bindings() {
        let mut unifier = Unifier::new();
        let v1 = Type::var(TypeVar::new(1));
        let v2 = Type::var(TypeVar::new(2));
        unify(&mut unifier, &v1, &Type::array(v2.clone())).unwrap();

        // binding v2 to [v1] would close the loop v1 -> [v2] -> [[v1]]
        let err = unify(&mut unifier, &v2, &Type::array(v1.clone())).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { var: 2, .. }));
        assert_eq!(unifier.lookup(2), None);

        // the session stays usable and substitution terminates
        unify(&mut unifier, &v2, &Type::int(8)).unwrap();
        assert_eq!(unifier.apply(&v1), Type::array(Type::int(8)));
    }

    #[test]
    fn test_occurs_check_covers_tie_break_constraints() {
        let mut unifier = Unifier::new();
        let constrained = Type::var(TypeVar::with_constraint(
            1,
            Type::array(Type::var(TypeVar::new(2))),
        ));
        let free = Type::var(TypeVar::new(2));
        let err = unify(&mut unifier, &free, &constrained).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { var: 2, .. }));
        assert_eq!(unifier.binding_count(), 0);
    }

    #[test]
    fn test_variables_still_capture_types_holding_other_variables() {
        let mut unifier = Unifier::new();
        let other = Type::array(Type::var(TypeVar::new(2)));
        unify(&mut unifier, &Type::var(TypeVar::new(1)), &other).unwrap();
        assert_eq!(unifier.lookup(1), Some(&other));
    }

    // ------------------------------------------------------------------
    // Structural types
    // ------------------------------------------------------------------

    #[test]
    fn test_arrays_unify_elementwise() {
        let mut unifier = Unifier::new();
        let v = Type::var(TypeVar::new(1));
        unify(&mut unifier, &Type::array(v), &Type::array(Type::uint(8))).unwrap();
        assert_eq!(unifier.resolve(1), Some(Type::uint(8)));

        let err = unify(
            &mut unifier,
            &Type::array(Type::int(32)),
            &Type::array(Type::boolean()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TypeError::Positioned {
                position: Position::ArrayElement,
                ..
            }
        ));
    }

    #[test]
    fn test_tuple_arity_must_match() {
        let mut unifier = Unifier::new();
        let pair = Type::tuple(vec![Type::int(32), Type::int(32)]);
        let triple = Type::tuple(vec![Type::int(32), Type::int(32), Type::int(32)]);
        let err = unify(&mut unifier, &pair, &triple).unwrap_err();
        assert!(matches!(
            err,
            TypeError::ArityMismatch {
                expected_len: 2,
                found_len: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_tuple_failure_names_the_element() {
        let mut unifier = Unifier::new();
        let a = Type::tuple(vec![Type::int(32), Type::string(), Type::boolean()]);
        let b = Type::tuple(vec![Type::int(32), Type::float(64), Type::boolean()]);
        let err = unify(&mut unifier, &a, &b).unwrap_err();
        match err {
            TypeError::Positioned {
                position: Position::TupleElement(1),
                source,
                ..
            } => assert!(matches!(*source, TypeError::Mismatch { .. })),
            other => panic!("expected positioned tuple error, got {other:?}"),
        }
    }

    #[test]
    fn test_first_tuple_failure_stops_the_walk() {
        let mut unifier = Unifier::new();
        let v = Type::var(TypeVar::new(1));
        let a = Type::tuple(vec![Type::string(), Type::boolean(), v]);
        let b = Type::tuple(vec![Type::string(), Type::int(8), Type::int(8)]);
        let err = unify(&mut unifier, &a, &b).unwrap_err();
        assert!(matches!(
            err,
            TypeError::Positioned {
                position: Position::TupleElement(1),
                ..
            }
        ));
        // element 2 was never reached
        assert_eq!(unifier.lookup(1), None);
    }

    #[test]
    fn test_function_params_then_result() {
        let mut unifier = Unifier::new();
        let v1 = Type::var(TypeVar::new(1));
        let v2 = Type::var(TypeVar::new(2));
        let a = Type::function(Type::tuple(vec![v1, Type::boolean()]), v2);
        let b = Type::function(
            Type::tuple(vec![Type::int(64), Type::boolean()]),
            Type::string(),
        );
        unify(&mut unifier, &a, &b).unwrap();
        assert_eq!(unifier.resolve(1), Some(Type::int(64)));
        assert_eq!(unifier.resolve(2), Some(Type::string()));

        let bad = Type::function(Type::tuple(vec![Type::int(64), Type::boolean()]), Type::unit());
        let err = unify(&mut unifier, &b, &bad).unwrap_err();
        assert!(matches!(
            err,
            TypeError::Positioned {
                position: Position::FunctionResult,
                ..
            }
        ));
    }

    #[test]
    fn test_function_against_non_function_is_a_mismatch() {
        let mut unifier = Unifier::new();
        let func = Type::function(Type::tuple(vec![]), Type::unit());
        let err = unify(&mut unifier, &func, &Type::boolean()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    // ------------------------------------------------------------------
    // Generic integers
    // ------------------------------------------------------------------

    #[test]
    fn test_any_int_accepts_every_width_of_its_sign() {
        for width in [8, 16, 32, 64] {
            let mut unifier = Unifier::new();
            unify(&mut unifier, &Type::any_int(Sign::Signed), &Type::int(width)).unwrap();
            unify(&mut unifier, &Type::uint(width), &Type::any_int(Sign::Unsigned)).unwrap();
        }
    }

    #[test]
    fn test_any_int_rejects_the_opposite_sign() {
        let mut unifier = Unifier::new();
        let err = unify(&mut unifier, &Type::any_int(Sign::Signed), &Type::uint(32)).unwrap_err();
        assert!(matches!(err, TypeError::SignednessMismatch { .. }));

        let err = unify(&mut unifier, &Type::int(16), &Type::any_int(Sign::Unsigned)).unwrap_err();
        assert!(matches!(err, TypeError::SignednessMismatch { .. }));

        let err = unify(
            &mut unifier,
            &Type::any_int(Sign::Signed),
            &Type::any_int(Sign::Unsigned),
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::SignednessMismatch { .. }));
    }

    #[test]
    fn test_any_int_rejects_non_integers() {
        let mut unifier = Unifier::new();
        let err = unify(&mut unifier, &Type::any_int(Sign::Signed), &Type::float(64)).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));

        let err = unify(&mut unifier, &Type::string(), &Type::any_int(Sign::Unsigned)).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn test_fixed_widths_do_not_cross() {
        let mut unifier = Unifier::new();
        let err = unify(&mut unifier, &Type::int(32), &Type::int(64)).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));

        let err = unify(&mut unifier, &Type::int(32), &Type::uint(32)).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    // ------------------------------------------------------------------
    // Equality fallback and limits
    // ------------------------------------------------------------------

    #[test]
    fn test_named_types_compare_by_name() {
        let mut unifier = Unifier::new();
        unify(&mut unifier, &Type::name("Point"), &Type::name("Point")).unwrap();
        let err = unify(&mut unifier, &Type::name("Point"), &Type::name("Rect")).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn test_polymorphic_pair_is_unsupported() {
        let mut unifier = Unifier::new();
        let poly = Type::poly(TypeVar::new(1), Type::var(TypeVar::new(1)));
        let err = unify(&mut unifier, &poly, &poly).unwrap_err();
        assert!(matches!(err, TypeError::Unsupported { .. }));
    }

    #[test]
    fn test_depth_limit_reports_instead_of_overflowing() {
        let config = UnifierConfig {
            max_depth: Some(8),
        };
        let mut unifier = Unifier::with_config(config);
        let mut a = Type::int(32);
        let mut b = Type::int(32);
        for _ in 0..32 {
            a = Type::array(a);
            b = Type::array(b);
        }
        let err = unify(&mut unifier, &a, &b).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            TypeError::DepthExceeded { limit: 8, .. }
        ));
    }
}
