//! Typed expression trees.
//!
//! An [`Expr`] is a shared, immutable handle. Cloning it is cheap and keeps
//! node identity: two clones of one handle are the *same* node
//! ([`Expr::ptr_eq`]), which is how a lambda's body refers to the parameters
//! the lambda declares. Nodes are only built through the checked constructors
//! on `Expr`, which enforce the static typing rules of each node kind.

pub mod pretty;
pub mod value;

use std::sync::Arc;

use serde::Serialize;

use crate::types::{Member, MethodRef, Type, TypeError};

pub use value::Value;

/// Shared handle to an immutable expression node.
#[derive(Debug, Clone)]
pub struct Expr(Arc<ExprKind>);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "node")]
pub enum ExprKind {
    Call(MethodCall),
    Lambda(Lambda),
    Parameter(Parameter),
    Member(MemberAccess),
    Constant(Constant),
    Unary(Unary),
    Binary(Binary),
    Conditional(Conditional),
    Invoke(Invoke),
    Default { ty: Type },
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodCall {
    /// Receiver; `None` for static calls.
    pub object: Option<Expr>,
    pub method: MethodRef,
    pub args: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lambda {
    /// Always a `Func<..>` type.
    pub delegate_type: Type,
    pub name: Option<String>,
    pub tail_call: bool,
    /// Parameter nodes; the body refers to these exact handles.
    pub params: Vec<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: Type,
    pub is_by_ref: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberAccess {
    /// Containing object; `None` for static members.
    pub object: Option<Expr>,
    pub member: Member,
}

#[derive(Debug, Clone, Serialize)]
pub struct Constant {
    pub value: Value,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Expr,
    pub ty: Type,
    /// Operator overload, if any.
    pub method: Option<MethodRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub lifted_to_null: bool,
    /// Operator overload, if any.
    pub method: Option<MethodRef>,
    /// Conversion lambda applied by coalesce.
    pub conversion: Option<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conditional {
    pub test: Expr,
    pub if_true: Expr,
    pub if_false: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize)]
pub struct Invoke {
    pub target: Expr,
    pub args: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Convert,
    TypeAs,
    Not,
    Negate,
    /// Wraps a lambda as data. The node's type is `Expression<F>` where `F`
    /// is the lambda's delegate type.
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    Coalesce,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Syntactic kind of a node, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Call,
    Lambda,
    Parameter,
    MemberAccess,
    Constant,
    Unary,
    Binary,
    Conditional,
    Invoke,
    Default,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node could not be constructed because it would be ill-typed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("no method '{name}' declared on '{declaring_type}'")]
    UnknownMethod { declaring_type: String, name: String },
    #[error("method '{0}' is an open generic definition")]
    OpenGenericMethod(String),
    #[error("static method '{0}' called with a receiver")]
    StaticWithReceiver(String),
    #[error("instance method '{0}' called without a receiver")]
    MissingReceiver(String),
    #[error("receiver of type '{found}' cannot call '{method}' declared on '{expected}'")]
    ReceiverMismatch { method: String, expected: Type, found: Type },
    #[error("'{method}' expects {expected} arguments, found {found}")]
    ArgumentCount { method: String, expected: usize, found: usize },
    #[error("argument {index} of '{method}' has type '{found}', expected '{expected}'")]
    ArgumentType { method: String, index: usize, expected: Type, found: Type },
    #[error("lambda parameter {index} is a {kind} node, not a parameter")]
    NotAParameter { index: usize, kind: NodeKind },
    #[error("'{0}' is not a delegate type taking {1} parameters")]
    DelegateShape(Type, usize),
    #[error("lambda parameter {index} has type '{found}', delegate expects '{expected}'")]
    LambdaParameterType { index: usize, expected: Type, found: Type },
    #[error("lambda body of type '{found}' is not assignable to delegate return type '{expected}'")]
    LambdaReturnType { expected: Type, found: Type },
    #[error("quote operand must be a lambda, found {0}")]
    QuoteOperand(NodeKind),
    #[error("operator {op} requires operands of one type, found '{left}' and '{right}'")]
    OperandMismatch { op: BinaryOp, left: Type, right: Type },
    #[error("a conversion lambda is only valid on Coalesce, found {0}")]
    UnexpectedConversion(BinaryOp),
    #[error("coalesce conversion must be a lambda, found {0}")]
    ConversionNotLambda(NodeKind),
    #[error("static member '{0}' accessed through an object")]
    StaticMemberWithObject(String),
    #[error("instance member '{0}' accessed without an object")]
    MissingMemberObject(String),
    #[error("object of type '{found}' has no member '{member}' declared on '{expected}'")]
    MemberObjectMismatch { member: String, expected: Type, found: Type },
    #[error("condition must be 'bool', found '{0}'")]
    ConditionNotBool(Type),
    #[error("conditional branches have different types '{0}' and '{1}'")]
    BranchMismatch(Type, Type),
    #[error("'{0}' cannot be invoked with {1} arguments")]
    NotInvocable(Type, usize),
    #[error("expected a {expected} node, found {found}")]
    WrongKind { expected: NodeKind, found: NodeKind },
}

impl Serialize for Expr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl Expr {
    fn from_kind(kind: ExprKind) -> Self {
        Expr(Arc::new(kind))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// True if both handles are the same node (not merely equal-looking).
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the node, stable for as long as any handle to it is alive.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn node_kind(&self) -> NodeKind {
        match self.kind() {
            ExprKind::Call(_) => NodeKind::Call,
            ExprKind::Lambda(_) => NodeKind::Lambda,
            ExprKind::Parameter(_) => NodeKind::Parameter,
            ExprKind::Member(_) => NodeKind::MemberAccess,
            ExprKind::Constant(_) => NodeKind::Constant,
            ExprKind::Unary(_) => NodeKind::Unary,
            ExprKind::Binary(_) => NodeKind::Binary,
            ExprKind::Conditional(_) => NodeKind::Conditional,
            ExprKind::Invoke(_) => NodeKind::Invoke,
            ExprKind::Default { .. } => NodeKind::Default,
        }
    }

    /// Static type of the value this node produces.
    pub fn ty(&self) -> &Type {
        match self.kind() {
            ExprKind::Call(c) => &c.ty,
            ExprKind::Lambda(l) => &l.delegate_type,
            ExprKind::Parameter(p) => &p.ty,
            ExprKind::Member(m) => &m.member.ty,
            ExprKind::Constant(c) => &c.ty,
            ExprKind::Unary(u) => &u.ty,
            ExprKind::Binary(b) => &b.ty,
            ExprKind::Conditional(c) => &c.ty,
            ExprKind::Invoke(i) => &i.ty,
            ExprKind::Default { ty } => ty,
        }
    }

    pub fn as_call(&self) -> Option<&MethodCall> {
        match self.kind() {
            ExprKind::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self.kind() {
            ExprKind::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self.kind() {
            ExprKind::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&MemberAccess> {
        match self.kind() {
            ExprKind::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self.kind() {
            ExprKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<&Unary> {
        match self.kind() {
            ExprKind::Unary(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self.kind() {
            ExprKind::Binary(b) => Some(b),
            _ => None,
        }
    }

    // ── Leaves ─────────────────────────────────────────────────────

    pub fn parameter(ty: Type, name: impl Into<String>) -> Expr {
        Self::parameter_with(ty, Some(name.into()), false)
    }

    pub fn by_ref_parameter(ty: Type, name: impl Into<String>) -> Expr {
        Self::parameter_with(ty, Some(name.into()), true)
    }

    pub fn parameter_with(ty: Type, name: Option<String>, is_by_ref: bool) -> Expr {
        Self::from_kind(ExprKind::Parameter(Parameter { name, ty, is_by_ref }))
    }

    pub fn constant(value: Value) -> Expr {
        let ty = value.ty();
        Self::from_kind(ExprKind::Constant(Constant { value, ty }))
    }

    pub fn default_value(ty: Type) -> Expr {
        Self::from_kind(ExprKind::Default { ty })
    }

    // ── Member access and calls ────────────────────────────────────

    pub fn member(object: Option<Expr>, member: Member) -> Result<Expr, BuildError> {
        match (&object, member.is_static) {
            (Some(_), true) => return Err(BuildError::StaticMemberWithObject(member.to_string())),
            (None, false) => return Err(BuildError::MissingMemberObject(member.to_string())),
            (Some(obj), false) if !obj.ty().is_assignable_to(&member.declaring_type) => {
                return Err(BuildError::MemberObjectMismatch {
                    member: member.name.clone(),
                    expected: member.declaring_type.clone(),
                    found: obj.ty().clone(),
                });
            }
            _ => {}
        }
        Ok(Self::from_kind(ExprKind::Member(MemberAccess { object, member })))
    }

    /// Build a call. A lambda passed where `Expression<F>` is expected, and
    /// whose own type is `F`, is quoted automatically.
    pub fn call(object: Option<Expr>, method: MethodRef, args: Vec<Expr>) -> Result<Expr, BuildError> {
        if method.is_generic_definition() {
            return Err(BuildError::OpenGenericMethod(method.to_string()));
        }
        match (&object, method.is_static()) {
            (Some(_), true) => return Err(BuildError::StaticWithReceiver(method.to_string())),
            (None, false) => return Err(BuildError::MissingReceiver(method.to_string())),
            _ => {}
        }
        if let Some(obj) = &object {
            if !obj.ty().is_assignable_to(method.declaring_type()) {
                return Err(BuildError::ReceiverMismatch {
                    method: method.to_string(),
                    expected: method.declaring_type().clone(),
                    found: obj.ty().clone(),
                });
            }
        }

        let params = method.parameter_types();
        if params.len() != args.len() {
            return Err(BuildError::ArgumentCount {
                method: method.to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }
        let args = args
            .into_iter()
            .zip(&params)
            .enumerate()
            .map(|(index, (arg, expected))| quote_if_needed(&method, index, arg, expected))
            .collect::<Result<Vec<_>, _>>()?;

        let ty = method.return_type();
        Ok(Self::from_kind(ExprKind::Call(MethodCall { object, method, args, ty })))
    }

    /// Rebuild a call with new children, keeping its method. Returns `self`
    /// when no child changed.
    pub fn update_call(&self, object: Option<Expr>, args: Vec<Expr>) -> Result<Expr, BuildError> {
        let call = self.as_call().ok_or(BuildError::WrongKind {
            expected: NodeKind::Call,
            found: self.node_kind(),
        })?;
        let same_object = match (&call.object, &object) {
            (Some(a), Some(b)) => Expr::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same_object && same_nodes(&call.args, &args) {
            return Ok(self.clone());
        }
        Self::call(object, call.method.clone(), args)
    }

    // ── Lambdas ────────────────────────────────────────────────────

    /// Lambda whose delegate type is inferred as `Func<param types..., body type>`.
    pub fn lambda(body: Expr, params: Vec<Expr>) -> Result<Expr, BuildError> {
        Self::lambda_with(body, None, false, params)
    }

    pub fn lambda_with(
        body: Expr,
        name: Option<String>,
        tail_call: bool,
        params: Vec<Expr>,
    ) -> Result<Expr, BuildError> {
        let param_types = params
            .iter()
            .enumerate()
            .map(|(index, p)| parameter_type(index, p).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let delegate_type = Type::func(param_types, body.ty().clone());
        Ok(Self::from_kind(ExprKind::Lambda(Lambda { delegate_type, name, tail_call, params, body })))
    }

    /// Lambda with an explicit delegate type, which must be a `Func` whose
    /// parameter types match `params` and whose return type accepts the body.
    pub fn lambda_typed(
        delegate_type: Type,
        body: Expr,
        name: Option<String>,
        tail_call: bool,
        params: Vec<Expr>,
    ) -> Result<Expr, BuildError> {
        let (expected_params, ret) = match delegate_type.func_signature() {
            Some((ps, ret)) if ps.len() == params.len() => (ps, ret),
            _ => return Err(BuildError::DelegateShape(delegate_type.clone(), params.len())),
        };
        for (index, (p, expected)) in params.iter().zip(expected_params).enumerate() {
            let found = parameter_type(index, p)?;
            if found != expected {
                return Err(BuildError::LambdaParameterType {
                    index,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        if !body.ty().is_assignable_to(ret) {
            return Err(BuildError::LambdaReturnType { expected: ret.clone(), found: body.ty().clone() });
        }
        Ok(Self::from_kind(ExprKind::Lambda(Lambda { delegate_type, name, tail_call, params, body })))
    }

    // ── Operators ──────────────────────────────────────────────────

    /// `ty` is used by `Convert` and `TypeAs`. `Not`/`Negate` take the operand
    /// type (or the overload's return type) and `Quote` derives its type from
    /// the quoted lambda.
    pub fn unary(op: UnaryOp, operand: Expr, ty: Type, method: Option<MethodRef>) -> Result<Expr, BuildError> {
        let ty = match op {
            UnaryOp::Quote => {
                if operand.as_lambda().is_none() {
                    return Err(BuildError::QuoteOperand(operand.node_kind()));
                }
                Type::expression(operand.ty().clone())
            }
            UnaryOp::Convert | UnaryOp::TypeAs => ty,
            UnaryOp::Not | UnaryOp::Negate => match &method {
                Some(m) => m.return_type(),
                None => operand.ty().clone(),
            },
        };
        Ok(Self::from_kind(ExprKind::Unary(Unary { op, operand, ty, method })))
    }

    pub fn convert(operand: Expr, ty: Type) -> Result<Expr, BuildError> {
        Self::unary(UnaryOp::Convert, operand, ty, None)
    }

    pub fn quote(lambda: Expr) -> Result<Expr, BuildError> {
        let ty = lambda.ty().clone();
        Self::unary(UnaryOp::Quote, lambda, ty, None)
    }

    /// Rebuild a unary node around a new operand, keeping operator, type and
    /// overload. Returns `self` when the operand is unchanged.
    pub fn update_unary(&self, operand: Expr) -> Result<Expr, BuildError> {
        let unary = self.as_unary().ok_or(BuildError::WrongKind {
            expected: NodeKind::Unary,
            found: self.node_kind(),
        })?;
        if Expr::ptr_eq(&unary.operand, &operand) {
            return Ok(self.clone());
        }
        Self::unary(unary.op, operand, unary.ty.clone(), unary.method.clone())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, BuildError> {
        Self::make_binary(op, left, right, false, None, None)
    }

    pub fn make_binary(
        op: BinaryOp,
        left: Expr,
        right: Expr,
        lifted_to_null: bool,
        method: Option<MethodRef>,
        conversion: Option<Expr>,
    ) -> Result<Expr, BuildError> {
        if let Some(conv) = &conversion {
            if op != BinaryOp::Coalesce {
                return Err(BuildError::UnexpectedConversion(op));
            }
            if conv.as_lambda().is_none() {
                return Err(BuildError::ConversionNotLambda(conv.node_kind()));
            }
        }

        let ty = match (&method, op) {
            (Some(m), _) => m.return_type(),
            (None, BinaryOp::Coalesce) => right.ty().clone(),
            (None, _) => {
                if left.ty() != right.ty() {
                    return Err(BuildError::OperandMismatch {
                        op,
                        left: left.ty().clone(),
                        right: right.ty().clone(),
                    });
                }
                if op.is_comparison() {
                    if lifted_to_null && left.ty().is_nullable() {
                        Type::nullable(Type::bool())
                    } else {
                        Type::bool()
                    }
                } else if matches!(op, BinaryOp::AndAlso | BinaryOp::OrElse) {
                    Type::bool()
                } else {
                    left.ty().clone()
                }
            }
        };

        Ok(Self::from_kind(ExprKind::Binary(Binary {
            op,
            left,
            right,
            lifted_to_null,
            method,
            conversion,
            ty,
        })))
    }

    // ── Kinds the rewriter does not handle ─────────────────────────

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Result<Expr, BuildError> {
        if *test.ty() != Type::bool() {
            return Err(BuildError::ConditionNotBool(test.ty().clone()));
        }
        if if_true.ty() != if_false.ty() {
            return Err(BuildError::BranchMismatch(if_true.ty().clone(), if_false.ty().clone()));
        }
        let ty = if_true.ty().clone();
        Ok(Self::from_kind(ExprKind::Conditional(Conditional { test, if_true, if_false, ty })))
    }

    pub fn invoke(target: Expr, args: Vec<Expr>) -> Result<Expr, BuildError> {
        let (params, ret) = match target.ty().func_signature() {
            Some((ps, ret)) if ps.len() == args.len() => (ps.to_vec(), ret.clone()),
            _ => return Err(BuildError::NotInvocable(target.ty().clone(), args.len())),
        };
        for (index, (arg, expected)) in args.iter().zip(&params).enumerate() {
            if !arg.ty().is_assignable_to(expected) {
                return Err(BuildError::ArgumentType {
                    method: "Invoke".to_string(),
                    index,
                    expected: expected.clone(),
                    found: arg.ty().clone(),
                });
            }
        }
        Ok(Self::from_kind(ExprKind::Invoke(Invoke { target, args, ty: ret })))
    }
}

fn parameter_type(index: usize, expr: &Expr) -> Result<&Type, BuildError> {
    expr.as_parameter()
        .map(|p| &p.ty)
        .ok_or(BuildError::NotAParameter { index, kind: expr.node_kind() })
}

fn quote_if_needed(method: &MethodRef, index: usize, arg: Expr, expected: &Type) -> Result<Expr, BuildError> {
    if arg.ty().is_assignable_to(expected) {
        return Ok(arg);
    }
    if arg.as_lambda().is_some() && expected.is_expression() && expected.generic_args()[0] == *arg.ty() {
        return Expr::quote(arg);
    }
    Err(BuildError::ArgumentType {
        method: method.to_string(),
        index,
        expected: expected.clone(),
        found: arg.ty().clone(),
    })
}

fn same_nodes(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Expr::ptr_eq(x, y))
}
