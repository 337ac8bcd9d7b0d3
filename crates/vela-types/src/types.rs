//! Type representations for the Vela type system.
//!
//! Values of [`Type`] are immutable once constructed; all mutation during
//! unification happens inside the [`Unifier`](crate::unifier::Unifier)
//! binding store. Fixed-width integers (`i8`..`u64`) are distinct types;
//! the width-generic [`Type::AnyInt`] stands in for integer literals whose
//! width has not been pinned down yet.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a type variable.
///
/// Source-declared variables carry non-negative ids assigned by the front
/// end. Variables minted by the engine carry strictly decreasing negative
/// ids, unique within one [`Unifier`](crate::unifier::Unifier) session.
pub type VarId = i64;

/// Integer signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Signed,
    Unsigned,
}

/// Atomic non-numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    String,
    Bool,
    Unit,
}

/// A type variable, optionally constrained.
///
/// The constraint restricts what the variable may be instantiated to:
/// every candidate must unify with the constraint before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeVar {
    pub id: VarId,
    pub constraint: Option<Box<Type>>,
}

impl TypeVar {
    pub fn new(id: VarId) -> Self {
        TypeVar { id, constraint: None }
    }

    pub fn with_constraint(id: VarId, constraint: Type) -> Self {
        TypeVar {
            id,
            constraint: Some(Box::new(constraint)),
        }
    }
}

/// The types the Vela compiler unifies over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Reference to a type variable.
    Var(TypeVar),
    /// `string`, `bool`, `unit`.
    Primitive(Primitive),
    /// Fixed-width integer such as `i32` or `u8`.
    Int { sign: Sign, width: u32 },
    /// Integer of any width with the given signedness.
    AnyInt(Sign),
    /// `f32` or `f64`.
    Float { width: u32 },
    /// Homogeneous array.
    Array(Box<Type>),
    /// Fixed-arity tuple.
    Tuple(Vec<Type>),
    /// Function from a parameter type (conventionally a tuple) to a result.
    Function {
        params: Box<Type>,
        result: Box<Type>,
    },
    /// Ordered alternatives; unification commits to the first that fits.
    Choice(Vec<Type>),
    /// Universally quantified over exactly one variable.
    Polymorphic { bound: TypeVar, body: Box<Type> },
    /// Opaque named type, compared by name.
    TypeName(String),
}

impl Type {
    pub fn var(var: TypeVar) -> Type {
        Type::Var(var)
    }

    pub fn string() -> Type {
        Type::Primitive(Primitive::String)
    }

    pub fn boolean() -> Type {
        Type::Primitive(Primitive::Bool)
    }

    pub fn unit() -> Type {
        Type::Primitive(Primitive::Unit)
    }

    /// Signed integer of the given bit width.
    pub fn int(width: u32) -> Type {
        Type::Int {
            sign: Sign::Signed,
            width,
        }
    }

    /// Unsigned integer of the given bit width.
    pub fn uint(width: u32) -> Type {
        Type::Int {
            sign: Sign::Unsigned,
            width,
        }
    }

    pub fn any_int(sign: Sign) -> Type {
        Type::AnyInt(sign)
    }

    /// Floating-point type; only 32 and 64 bit widths exist in Vela.
    pub fn float(width: u32) -> Type {
        debug_assert!(width == 32 || width == 64, "float width must be 32 or 64");
        Type::Float { width }
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn tuple(elements: Vec<Type>) -> Type {
        Type::Tuple(elements)
    }

    pub fn function(params: Type, result: Type) -> Type {
        Type::Function {
            params: Box::new(params),
            result: Box::new(result),
        }
    }

    pub fn choice(alternatives: Vec<Type>) -> Type {
        Type::Choice(alternatives)
    }

    pub fn poly(bound: TypeVar, body: Type) -> Type {
        Type::Polymorphic {
            bound,
            body: Box::new(body),
        }
    }

    pub fn name(name: impl Into<String>) -> Type {
        Type::TypeName(name.into())
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    /// True for both fixed-width and width-generic integers.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int { .. } | Type::AnyInt(_))
    }

    /// Signedness of an integer type, `None` for everything else.
    pub fn sign(&self) -> Option<Sign> {
        match self {
            Type::Int { sign, .. } | Type::AnyInt(sign) => Some(*sign),
            _ => None,
        }
    }

    /// Whether the variable with the given id occurs anywhere in this type,
    /// including inside constraints and quantified bodies.
    pub fn contains_var(&self, id: VarId) -> bool {
        match self {
            Type::Var(v) => {
                v.id == id
                    || v.constraint
                        .as_ref()
                        .is_some_and(|c| c.contains_var(id))
            }
            Type::Primitive(_)
            | Type::Int { .. }
            | Type::AnyInt(_)
            | Type::Float { .. }
            | Type::TypeName(_) => false,
            Type::Array(element) => element.contains_var(id),
            Type::Tuple(elements) => elements.iter().any(|e| e.contains_var(id)),
            Type::Function { params, result } => {
                params.contains_var(id) || result.contains_var(id)
            }
            Type::Choice(alternatives) => alternatives.iter().any(|a| a.contains_var(id)),
            Type::Polymorphic { bound, body } => bound.id == id || body.contains_var(id),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(v) => write!(f, "v{}", v.id),
            Type::Primitive(Primitive::String) => f.write_str("string"),
            Type::Primitive(Primitive::Bool) => f.write_str("bool"),
            Type::Primitive(Primitive::Unit) => f.write_str("unit"),
            Type::Int {
                sign: Sign::Signed,
                width,
            } => write!(f, "i{width}"),
            Type::Int {
                sign: Sign::Unsigned,
                width,
            } => write!(f, "u{width}"),
            Type::AnyInt(Sign::Signed) => f.write_str("int"),
            Type::AnyInt(Sign::Unsigned) => f.write_str("uint"),
            Type::Float { width } => write!(f, "f{width}"),
            Type::Array(element) => write!(f, "[{element}]"),
            Type::Tuple(elements) => {
                f.write_str("(")?;
                write_joined(f, elements, ", ")?;
                f.write_str(")")
            }
            Type::Function { params, result } => {
                match params.as_ref() {
                    Type::Tuple(elements) => {
                        f.write_str("fn(")?;
                        write_joined(f, elements, ", ")?;
                        f.write_str(")")?;
                    }
                    other => write!(f, "fn({other})")?,
                }
                write!(f, " -> {result}")
            }
            Type::Choice(alternatives) => write_joined(f, alternatives, " | "),
            Type::Polymorphic { bound, body } => write!(f, "forall v{}. {body}", bound.id),
            Type::TypeName(name) => f.write_str(name),
        }
    }
}
