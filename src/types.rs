use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::TypeSyntaxError;

pub const OBJECT: &str = "object";
pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const LONG: &str = "long";
pub const DOUBLE: &str = "double";
pub const STRING: &str = "string";
pub const QUERY: &str = "Query";
pub const ENUMERABLE: &str = "Enumerable";
pub const NULLABLE: &str = "Nullable";
pub const FUNC: &str = "Func";
pub const EXPRESSION: &str = "Expression";

/// Static type descriptor.
///
/// Names are stored fully qualified (`Models.ItemFrom`); `name()` yields the
/// simple name used by by-name substitution. A generic type's identity is its
/// definition name plus the ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    /// Non-generic terminal type, e.g. `long` or `Models.ItemFrom`.
    Named(String),
    /// Instantiation of a generic definition, e.g. `Query<Models.ItemFrom>`.
    Generic(String, Vec<Type>),
    /// Type parameter placeholder inside an open generic signature.
    Param(String),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn generic(definition: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Generic(definition.into(), args)
    }

    pub fn param(name: impl Into<String>) -> Self {
        Type::Param(name.into())
    }

    pub fn object() -> Self {
        Type::named(OBJECT)
    }

    pub fn bool() -> Self {
        Type::named(BOOL)
    }

    pub fn int() -> Self {
        Type::named(INT)
    }

    pub fn long() -> Self {
        Type::named(LONG)
    }

    pub fn double() -> Self {
        Type::named(DOUBLE)
    }

    pub fn string() -> Self {
        Type::named(STRING)
    }

    pub fn query(elem: Type) -> Self {
        Type::generic(QUERY, vec![elem])
    }

    pub fn enumerable(elem: Type) -> Self {
        Type::generic(ENUMERABLE, vec![elem])
    }

    pub fn nullable(inner: Type) -> Self {
        Type::generic(NULLABLE, vec![inner])
    }

    /// Quoted-expression wrapper around a delegate type.
    pub fn expression(delegate: Type) -> Self {
        Type::generic(EXPRESSION, vec![delegate])
    }

    /// Delegate type `Func<params..., ret>`.
    pub fn func(params: Vec<Type>, ret: Type) -> Self {
        let mut args = params;
        args.push(ret);
        Type::generic(FUNC, args)
    }

    /// Fully qualified name (definition name for generic instantiations).
    pub fn full_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::Generic(n, _) | Type::Param(n) => n,
        }
    }

    /// Simple name: the last dotted segment of `full_name()`.
    pub fn name(&self) -> &str {
        let full = self.full_name();
        full.rsplit_once('.').map_or(full, |(_, simple)| simple)
    }

    pub fn generic_args(&self) -> &[Type] {
        match self {
            Type::Generic(_, args) => args,
            _ => &[],
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Type::Named(n) if n == OBJECT)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Generic(d, args) if d == NULLABLE && args.len() == 1)
    }

    /// `Expression<F>`: the element is the wrapped delegate type.
    pub fn is_expression(&self) -> bool {
        matches!(self, Type::Generic(d, args) if d == EXPRESSION && args.len() == 1)
    }

    /// Splits a `Func<params..., ret>` into its parameter types and return type.
    pub fn func_signature(&self) -> Option<(&[Type], &Type)> {
        match self {
            Type::Generic(d, args) if d == FUNC => {
                let (ret, params) = args.split_last()?;
                Some((params, ret))
            }
            _ => None,
        }
    }

    /// Rebuild generic arguments through `f`. Terminal types are returned unchanged.
    pub fn map_inner_types(&self, f: &impl Fn(&Type) -> Type) -> Type {
        match self {
            Type::Generic(def, args) => Type::Generic(def.clone(), args.iter().map(f).collect()),
            _ => self.clone(),
        }
    }

    /// Replace type parameters by their bindings, recursing into generic arguments.
    pub fn substitute_params(&self, bindings: &HashMap<String, Type>) -> Type {
        match self {
            Type::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            _ => self.map_inner_types(&|t| t.substitute_params(bindings)),
        }
    }

    /// Turn `Named(n)` into `Param(n)` wherever `n` is one of `params`.
    /// Parsed signatures cannot tell the two apart on their own.
    pub fn promote_params(&self, params: &[String]) -> Type {
        match self {
            Type::Named(n) if params.iter().any(|p| p == n) => Type::Param(n.clone()),
            _ => self.map_inner_types(&|t| t.promote_params(params)),
        }
    }

    /// Implicit reference/identity conversion between static types.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if self == target || target.is_object() {
            return true;
        }
        match (self, target) {
            (Type::Generic(from, xs), Type::Generic(to, ys)) => {
                from == QUERY && to == ENUMERABLE && xs == ys
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named(name) | Type::Param(name) => write!(f, "{name}"),
            Type::Generic(def, args) => {
                write!(f, "{def}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{a}")?;
                }
                write!(f, ">")
            }
        }
    }
}

impl std::str::FromStr for Type {
    type Err = TypeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_type(s)
    }
}

impl TryFrom<String> for Type {
    type Error = TypeSyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> Self {
        ty.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Property,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberKind::Field => write!(f, "field"),
            MemberKind::Property => write!(f, "property"),
        }
    }
}

/// A field or property resolved against a concrete declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub declaring_type: Type,
    pub name: String,
    pub kind: MemberKind,
    pub ty: Type,
    #[serde(default)]
    pub is_static: bool,
}

impl Member {
    pub fn property(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Self { declaring_type, name: name.into(), kind: MemberKind::Property, ty, is_static: false }
    }

    pub fn field(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Self { declaring_type, name: name.into(), kind: MemberKind::Field, ty, is_static: false }
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

/// Method signature as declared. Parameter and return types of a generic
/// definition refer to its type parameters through `Type::Param`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDef {
    pub declaring_type: Type,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("method '{method}' expects {expected} type arguments, found {found}")]
    GenericArity { method: String, expected: usize, found: usize },
    #[error("method '{0}' is not generic")]
    NotGeneric(String),
}

/// A method reference: the definition plus, for generic methods, the ordered
/// type arguments it is closed over. An empty argument list on a generic
/// definition denotes the open definition itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    def: Arc<MethodDef>,
    type_args: Vec<Type>,
}

impl MethodRef {
    pub fn new(def: Arc<MethodDef>) -> Self {
        Self { def, type_args: Vec::new() }
    }

    /// Close a generic definition over `type_args`.
    pub fn make_generic(def: &Arc<MethodDef>, type_args: Vec<Type>) -> Result<Self, TypeError> {
        if def.type_params.is_empty() {
            return Err(TypeError::NotGeneric(def.name.clone()));
        }
        if def.type_params.len() != type_args.len() {
            return Err(TypeError::GenericArity {
                method: def.name.clone(),
                expected: def.type_params.len(),
                found: type_args.len(),
            });
        }
        Ok(Self { def: Arc::clone(def), type_args })
    }

    pub fn definition(&self) -> &Arc<MethodDef> {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn declaring_type(&self) -> &Type {
        &self.def.declaring_type
    }

    pub fn is_static(&self) -> bool {
        self.def.is_static
    }

    pub fn is_generic(&self) -> bool {
        !self.def.type_params.is_empty()
    }

    pub fn is_generic_definition(&self) -> bool {
        self.is_generic() && self.type_args.is_empty()
    }

    pub fn generic_arguments(&self) -> &[Type] {
        &self.type_args
    }

    fn bindings(&self) -> HashMap<String, Type> {
        self.def.type_params.iter().cloned().zip(self.type_args.iter().cloned()).collect()
    }

    pub fn parameter_types(&self) -> Vec<Type> {
        let bindings = self.bindings();
        self.def.params.iter().map(|p| p.substitute_params(&bindings)).collect()
    }

    pub fn return_type(&self) -> Type {
        self.def.return_type.substitute_params(&self.bindings())
    }
}

impl std::fmt::Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.def.declaring_type, self.def.name)?;
        if !self.type_args.is_empty() {
            write!(f, "<")?;
            for (i, a) in self.type_args.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{a}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl Serialize for MethodRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
