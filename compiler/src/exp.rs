//! The expression model the compiler consumes.
//!
//! Expressions arrive already parsed and mostly resolved. Calls the resolver
//! could not bind yet are kept as [`UnresolvedCall`] and bound to a
//! [`Builtin`] by the validator before compilation.

use crate::builtin;
use crate::{CompileContext, CompileResult, Parameter};
use mdx_calc::{ArithmeticOp, CalcRef, ConstantCalc, LogicalOp};
use mdx_core::{Dimension, Hierarchy, Level, Member, Value};
use mdx_types::{DimensionType, HierarchyType, LevelType, MemberType, ScalarType, Type};
use std::fmt;
use std::sync::Arc;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Integer(i64),
    Numeric(f64),
    String(String),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    /// A bare keyword, such as the target type of a cast.
    Symbol(String),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Null => Type::null(),
            Literal::Integer(_) => Type::integer(),
            Literal::Numeric(_) => Type::numeric(),
            Literal::String(_) | Literal::Symbol(_) => Type::string(),
            Literal::Boolean(_) => Type::boolean(),
            Literal::DateTime(_) => Type::datetime(),
        }
    }

    pub fn value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Integer(i) => Value::Int(*i),
            Literal::Numeric(d) => Value::Double(*d),
            Literal::String(s) | Literal::Symbol(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::DateTime(t) => Value::DateTime(*t),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Numeric(d) => write!(f, "{}", d),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::DateTime(t) => write!(f, "DATETIME({})", t),
            Literal::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// How a call is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// `x.Name`
    Property,
    /// `Name(x, y)`
    Function,
    /// `x op y`
    Infix,
    /// `op x`
    Prefix,
    /// `{x, y}`
    Braces,
    /// `(x, y)`
    Parentheses,
}

/// A function the compiler knows how to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `<Hierarchy>.CurrentMember`
    CurrentMember,
    /// `<Hierarchy>.DefaultMember`
    DefaultMember,
    /// `<Member>.Hierarchy`, `<Level>.Hierarchy`
    Hierarchy,
    /// `<Member>.Dimension`, `<Level>.Dimension`, `<Hierarchy>.Dimension`
    Dimension,
    /// `<Member>.Level`
    Level,
    /// `<Level>.Members`
    Members,
    /// `(m1, m2, ...)`
    Tuple,
    /// `{e1, e2, ...}`
    Set,
    /// `Cast(x AS type)`
    Cast(ScalarType),
    Arithmetic(ArithmeticOp),
    /// `s1 || s2`
    Concat,
    Logical(LogicalOp),
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::CurrentMember => "CurrentMember",
            Builtin::DefaultMember => "DefaultMember",
            Builtin::Hierarchy => "Hierarchy",
            Builtin::Dimension => "Dimension",
            Builtin::Level => "Level",
            Builtin::Members => "Members",
            Builtin::Tuple => "()",
            Builtin::Set => "{}",
            Builtin::Cast(_) => "Cast",
            Builtin::Arithmetic(ArithmeticOp::Add) => "+",
            Builtin::Arithmetic(ArithmeticOp::Sub) => "-",
            Builtin::Arithmetic(ArithmeticOp::Mul) => "*",
            Builtin::Arithmetic(ArithmeticOp::Div) => "/",
            Builtin::Concat => "||",
            Builtin::Logical(LogicalOp::And) => "AND",
            Builtin::Logical(LogicalOp::Or) => "OR",
            Builtin::Logical(LogicalOp::Not) => "NOT",
        }
    }

    pub fn syntax(&self) -> Syntax {
        match self {
            Builtin::CurrentMember
            | Builtin::DefaultMember
            | Builtin::Hierarchy
            | Builtin::Dimension
            | Builtin::Level
            | Builtin::Members => Syntax::Property,
            Builtin::Tuple => Syntax::Parentheses,
            Builtin::Set => Syntax::Braces,
            Builtin::Cast(_) => Syntax::Function,
            Builtin::Arithmetic(_) | Builtin::Concat => Syntax::Infix,
            Builtin::Logical(LogicalOp::Not) => Syntax::Prefix,
            Builtin::Logical(_) => Syntax::Infix,
        }
    }
}

/// A call bound to a builtin, with its static return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunCall {
    pub fun: Builtin,
    pub args: Vec<Exp>,
    pub ty: Type,
}

/// A call the validator has not bound yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedCall {
    pub name: String,
    pub syntax: Syntax,
    pub args: Vec<Exp>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    Literal(Literal),
    Member(Arc<Member>),
    Level(Arc<Level>),
    Hierarchy(Arc<Hierarchy>),
    Dimension(Arc<Dimension>),
    Parameter(Arc<Parameter>),
    Call(Box<FunCall>),
    Unresolved(Box<UnresolvedCall>),
}

impl Exp {
    pub fn null() -> Self {
        Exp::Literal(Literal::Null)
    }

    pub fn integer(value: i64) -> Self {
        Exp::Literal(Literal::Integer(value))
    }

    pub fn numeric(value: f64) -> Self {
        Exp::Literal(Literal::Numeric(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Exp::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Exp::Literal(Literal::Boolean(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Exp::Literal(Literal::Symbol(name.into()))
    }

    /// A resolved call.
    pub fn call(fun: Builtin, args: Vec<Exp>, ty: Type) -> Self {
        Exp::Call(Box::new(FunCall { fun, args, ty }))
    }

    /// A call to be bound by the validator.
    pub fn unresolved(name: impl Into<String>, syntax: Syntax, args: Vec<Exp>) -> Self {
        Exp::Unresolved(Box::new(UnresolvedCall {
            name: name.into(),
            syntax,
            args,
        }))
    }

    /// `<exp>.Name`
    pub fn property(exp: Exp, name: impl Into<String>) -> Self {
        Self::unresolved(name, Syntax::Property, vec![exp])
    }

    /// Static type of the expression.
    ///
    /// An unresolved call has no known type yet and reports plain scalar.
    pub fn ty(&self) -> Type {
        match self {
            Exp::Literal(literal) => literal.ty(),
            Exp::Member(m) => Type::Member(MemberType::for_member(m)),
            Exp::Level(l) => Type::Level(LevelType::for_level(l)),
            Exp::Hierarchy(h) => Type::Hierarchy(HierarchyType::for_hierarchy(h)),
            Exp::Dimension(d) => Type::Dimension(DimensionType::for_dimension(d)),
            Exp::Parameter(p) => p.ty().clone(),
            Exp::Call(call) => call.ty.clone(),
            Exp::Unresolved(_) => Type::scalar(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Exp::Unresolved(_))
    }

    /// Compile the expression as itself, without any conversion.
    ///
    /// Sub-expressions are compiled through the active compiler of `cx`.
    pub fn accept(&self, cx: &mut CompileContext<'_>) -> CompileResult<CalcRef> {
        let calc: CalcRef = match self {
            Exp::Literal(literal) => Arc::new(ConstantCalc::new(literal.ty(), literal.value())),
            Exp::Member(m) => Arc::new(ConstantCalc::member(m.clone())),
            Exp::Level(l) => Arc::new(ConstantCalc::level(l.clone())),
            Exp::Hierarchy(h) => Arc::new(ConstantCalc::hierarchy(h.clone())),
            Exp::Dimension(d) => Arc::new(ConstantCalc::dimension(d.clone())),
            Exp::Parameter(p) => {
                let compiler = cx.compiler();
                let slot = compiler.register_parameter(cx, p)?;
                Arc::new(crate::ParameterCalc::new(slot))
            }
            Exp::Call(call) => builtin::compile_call(call, cx)?,
            Exp::Unresolved(_) => {
                let resolved = cx.validator().validate(self, false)?;
                return resolved.accept(cx);
            }
        };
        Ok(calc)
    }
}

fn join(f: &mut fmt::Formatter<'_>, args: &[Exp], separator: &str) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

fn render_call(f: &mut fmt::Formatter<'_>, name: &str, syntax: Syntax, args: &[Exp]) -> fmt::Result {
    match (syntax, args) {
        (Syntax::Property, [target, ..]) => write!(f, "{}.{}", target, name),
        (Syntax::Infix, [left, right]) => write!(f, "({} {} {})", left, name, right),
        (Syntax::Prefix, [operand]) => write!(f, "{} {}", name, operand),
        (Syntax::Braces, _) => {
            write!(f, "{{")?;
            join(f, args, ", ")?;
            write!(f, "}}")
        }
        (Syntax::Parentheses, _) => {
            write!(f, "(")?;
            join(f, args, ", ")?;
            write!(f, ")")
        }
        _ => {
            write!(f, "{}(", name)?;
            join(f, args, ", ")?;
            write!(f, ")")
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exp::Literal(literal) => write!(f, "{}", literal),
            Exp::Member(m) => write!(f, "{}", m.unique_name),
            Exp::Level(l) => write!(f, "{}", l.unique_name),
            Exp::Hierarchy(h) => write!(f, "{}", h.unique_name),
            Exp::Dimension(d) => write!(f, "{}", d.unique_name),
            Exp::Parameter(p) => write!(f, "ParamRef(\"{}\")", p.name()),
            Exp::Call(call) => match (call.fun, call.args.as_slice()) {
                (Builtin::Cast(target), [arg]) => write!(f, "Cast({} AS {})", arg, target),
                (fun, args) => render_call(f, fun.name(), fun.syntax(), args),
            },
            Exp::Unresolved(call) => render_call(f, &call.name, call.syntax, &call.args),
        }
    }
}
