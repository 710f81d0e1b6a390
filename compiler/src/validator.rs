//! Binding of unresolved calls to builtins.

use crate::{Builtin, CompileError, CompileResult, Exp, FunCall, Literal, Syntax, UnresolvedCall};
use mdx_calc::{ArithmeticCalc, ArithmeticOp, LogicalOp};
use mdx_types::{
    common_type, DimensionType, HierarchyType, LevelType, MemberType, NumericType, ScalarType,
    Type,
};

/// Resolves calls and computes their static types.
///
/// The compiler calls the validator on every unresolved expression it meets,
/// including the `.DefaultMember` and `Cast` calls it synthesizes itself.
pub trait Validator {
    /// Resolve `exp`. `scalar_context` tells whether the caller expects a
    /// scalar value.
    fn validate(&self, exp: &Exp, scalar_context: bool) -> CompileResult<Exp>;
}

/// Validator for the builtin function table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValidator;

impl Validator for BuiltinValidator {
    fn validate(&self, exp: &Exp, scalar_context: bool) -> CompileResult<Exp> {
        match exp {
            Exp::Unresolved(call) => self.resolve(call, scalar_context),
            Exp::Call(call) if call.args.iter().any(|a| !a.is_resolved()) => {
                let args = self.validate_args(&call.args, false)?;
                Ok(Exp::call(call.fun, args, call.ty.clone()))
            }
            _ => Ok(exp.clone()),
        }
    }
}

impl BuiltinValidator {
    fn validate_args(&self, args: &[Exp], scalar_context: bool) -> CompileResult<Vec<Exp>> {
        args.iter()
            .map(|a| self.validate(a, scalar_context))
            .collect()
    }

    fn resolve(&self, call: &UnresolvedCall, scalar_context: bool) -> CompileResult<Exp> {
        let name = call.name.to_ascii_uppercase();

        // Parentheses around a single expression only group it.
        if call.syntax == Syntax::Parentheses && call.args.len() == 1 {
            return self.validate(&call.args[0], scalar_context);
        }

        let scalar_args = matches!(
            name.as_str(),
            "CAST" | "+" | "-" | "*" | "/" | "||" | "AND" | "OR" | "NOT"
        );
        let args = self.validate_args(&call.args, scalar_args)?;

        let (fun, ty) = match (call.syntax, name.as_str()) {
            (Syntax::Property, "CURRENTMEMBER") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["hierarchy", "dimension"])?;
                (Builtin::CurrentMember, Type::Member(MemberType::for_type(&target.ty())))
            }
            (Syntax::Property, "DEFAULTMEMBER") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["hierarchy", "dimension"])?;
                (Builtin::DefaultMember, Type::Member(MemberType::for_type(&target.ty())))
            }
            (Syntax::Property, "HIERARCHY") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["member", "level", "dimension"])?;
                (Builtin::Hierarchy, Type::Hierarchy(HierarchyType::for_type(&target.ty())))
            }
            (Syntax::Property, "DIMENSION") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["member", "level", "hierarchy"])?;
                (Builtin::Dimension, Type::Dimension(DimensionType::for_type(&target.ty())))
            }
            (Syntax::Property, "LEVEL") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["member"])?;
                (Builtin::Level, Type::Level(LevelType::for_type(&target.ty())))
            }
            (Syntax::Property, "MEMBERS") => {
                let target = one_arg(call, &args)?;
                expect(call, target, &["level"])?;
                let element = Type::Member(MemberType::for_type(&target.ty()));
                (Builtin::Members, Type::set(element))
            }
            (Syntax::Parentheses, _) => {
                let mut elements = Vec::with_capacity(args.len());
                for arg in &args {
                    expect(call, arg, &["member", "hierarchy", "dimension"])?;
                    elements.extend(arg.ty().to_member_type().map(Type::Member));
                }
                (Builtin::Tuple, Type::Tuple(elements))
            }
            (Syntax::Braces, _) => (Builtin::Set, set_type(call, &args)?),
            (Syntax::Function, "CAST") => return resolve_cast(call, args),
            (Syntax::Infix, "+" | "-" | "*" | "/") => {
                let op = match name.as_str() {
                    "+" => ArithmeticOp::Add,
                    "-" => ArithmeticOp::Sub,
                    "*" => ArithmeticOp::Mul,
                    _ => ArithmeticOp::Div,
                };
                let (left, right) = two_args(call, &args)?;
                expect_scalar(call, left, ScalarType::is_numeric)?;
                expect_scalar(call, right, ScalarType::is_numeric)?;
                let ty = ArithmeticCalc::result_type(
                    op,
                    &left.ty().value_type(),
                    &right.ty().value_type(),
                );
                (Builtin::Arithmetic(op), ty)
            }
            (Syntax::Infix, "||") => {
                if args.len() < 2 {
                    return Err(arity_error(call, "at least 2"));
                }
                for arg in &args {
                    expect_scalar(call, arg, |s| *s == ScalarType::String)?;
                }
                (Builtin::Concat, Type::string())
            }
            (Syntax::Infix, "AND" | "OR") => {
                let (left, right) = two_args(call, &args)?;
                expect_scalar(call, left, |s| *s == ScalarType::Boolean || s.is_numeric())?;
                expect_scalar(call, right, |s| *s == ScalarType::Boolean || s.is_numeric())?;
                let op = if name == "AND" { LogicalOp::And } else { LogicalOp::Or };
                (Builtin::Logical(op), Type::boolean())
            }
            (Syntax::Prefix, "NOT") => {
                let operand = one_arg(call, &args)?;
                expect_scalar(call, operand, |s| *s == ScalarType::Boolean || s.is_numeric())?;
                (Builtin::Logical(LogicalOp::Not), Type::boolean())
            }
            _ => {
                return Err(CompileError::validation(format!(
                    "No function matches signature '{}'",
                    Exp::Unresolved(Box::new(call.clone()))
                )))
            }
        };

        Ok(Exp::Call(Box::new(FunCall { fun, args, ty })))
    }
}

fn arity_error(call: &UnresolvedCall, expected: &str) -> CompileError {
    CompileError::validation(format!(
        "'{}' expects {} argument(s), got {}",
        call.name,
        expected,
        call.args.len()
    ))
}

fn one_arg<'e>(call: &UnresolvedCall, args: &'e [Exp]) -> CompileResult<&'e Exp> {
    match args {
        [only] => Ok(only),
        _ => Err(arity_error(call, "1")),
    }
}

fn two_args<'e>(call: &UnresolvedCall, args: &'e [Exp]) -> CompileResult<(&'e Exp, &'e Exp)> {
    match args {
        [left, right] => Ok((left, right)),
        _ => Err(arity_error(call, "2")),
    }
}

fn category(ty: &Type) -> &'static str {
    match ty {
        Type::Scalar(_) => "scalar",
        Type::Member(_) => "member",
        Type::Level(_) => "level",
        Type::Hierarchy(_) => "hierarchy",
        Type::Dimension(_) => "dimension",
        Type::Tuple(_) => "tuple",
        Type::Set(_) => "set",
        Type::Cube => "cube",
    }
}

fn expect(call: &UnresolvedCall, arg: &Exp, allowed: &[&str]) -> CompileResult<()> {
    let actual = category(&arg.ty());
    if allowed.contains(&actual) {
        return Ok(());
    }
    Err(CompileError::validation(format!(
        "'{}' does not accept a {} argument ({}); expected {}",
        call.name,
        actual,
        arg,
        allowed.join(" or ")
    )))
}

fn expect_scalar(
    call: &UnresolvedCall,
    arg: &Exp,
    accepts: impl Fn(&ScalarType) -> bool,
) -> CompileResult<()> {
    let ty = arg.ty();
    let accepted = match &ty {
        Type::Scalar(ScalarType::Any | ScalarType::Null) => true,
        Type::Scalar(s) => accepts(s),
        // Cell values read through members and tuples are untyped.
        Type::Member(_) | Type::Hierarchy(_) | Type::Dimension(_) | Type::Tuple(_) => true,
        Type::Level(_) | Type::Set(_) | Type::Cube => false,
    };
    if accepted {
        return Ok(());
    }
    Err(CompileError::validation(format!(
        "'{}' does not accept argument {} of type {}",
        call.name, arg, ty
    )))
}

fn set_type(call: &UnresolvedCall, args: &[Exp]) -> CompileResult<Type> {
    let mut elements = Vec::with_capacity(args.len());
    for arg in args {
        let ty = arg.ty();
        let element = match &ty {
            Type::Set(element) => (**element).clone(),
            other => other.to_member_or_tuple_type().ok_or_else(|| {
                CompileError::validation(format!(
                    "'{}' does not accept a {} element ({})",
                    call.name,
                    category(other),
                    arg
                ))
            })?,
        };
        elements.push(element);
    }
    if elements.is_empty() {
        return Ok(Type::set(Type::Member(MemberType::unknown())));
    }
    let arity = elements[0].arity();
    if elements.iter().any(|e| e.arity() != arity) {
        return Err(CompileError::validation(format!(
            "All elements of set {} must have the same arity",
            Exp::Unresolved(Box::new(call.clone()))
        )));
    }
    common_type(false, &elements).map(Type::set).ok_or_else(|| {
        CompileError::validation(format!(
            "Elements of set {} have no common type",
            Exp::Unresolved(Box::new(call.clone()))
        ))
    })
}

/// The scalar type a cast keyword names.
pub(crate) fn cast_target(name: &str) -> Option<ScalarType> {
    match name.to_ascii_uppercase().as_str() {
        "INTEGER" => Some(ScalarType::Numeric(NumericType::integer())),
        "NUMERIC" | "DOUBLE" | "DECIMAL" => Some(ScalarType::Numeric(NumericType::Any)),
        "STRING" => Some(ScalarType::String),
        "BOOLEAN" => Some(ScalarType::Boolean),
        "DATETIME" => Some(ScalarType::DateTime),
        _ => None,
    }
}

/// The keyword naming a cast to `target`, if one exists.
pub(crate) fn cast_keyword(target: ScalarType) -> Option<&'static str> {
    match target {
        ScalarType::Numeric(n) if n.is_integer() => Some("Integer"),
        ScalarType::Numeric(_) => Some("Numeric"),
        ScalarType::String => Some("String"),
        ScalarType::Boolean => Some("Boolean"),
        ScalarType::DateTime => Some("DateTime"),
        ScalarType::Any | ScalarType::Null => None,
    }
}

fn resolve_cast(call: &UnresolvedCall, mut args: Vec<Exp>) -> CompileResult<Exp> {
    let target = match args.pop() {
        Some(Exp::Literal(Literal::Symbol(name))) if args.len() == 1 => cast_target(&name)
            .ok_or_else(|| CompileError::validation(format!("Unknown cast target type '{}'", name)))?,
        _ => return Err(arity_error(call, "an expression and a target type")),
    };
    let source = &args[0];
    if !(source.ty().is_scalar() || source.ty().to_member_or_tuple_type().is_some()) {
        return Err(CompileError::validation(format!(
            "Cannot cast {} of type {}",
            source,
            source.ty()
        )));
    }
    Ok(Exp::call(Builtin::Cast(target), args, Type::Scalar(target)))
}
