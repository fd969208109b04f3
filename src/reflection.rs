//! Static type metadata: the member lookup facade the rewriter consults, and
//! a catalog implementation of it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::expr::BuildError;
use crate::types::{Member, MemberKind, MethodDef, MethodRef, Type};

/// Member lookup by name on a concrete type.
///
/// Implementations must be pure queries over static metadata.
pub trait Reflect {
    fn property(&self, ty: &Type, name: &str) -> Option<Member>;
    fn field(&self, ty: &Type, name: &str) -> Option<Member>;
}

/// A declared field or property. Its type may mention the class's type parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// A class declaration, keyed in the catalog by its fully qualified name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub properties: Vec<MemberDecl>,
    #[serde(default)]
    pub fields: Vec<MemberDecl>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), type_params: Vec::new(), properties: Vec::new(), fields: Vec::new() }
    }

    pub fn with_type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.properties.push(MemberDecl { name: name.into(), ty, is_static: false });
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(MemberDecl { name: name.into(), ty, is_static: false });
        self
    }

    pub fn with_static_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(MemberDecl { name: name.into(), ty, is_static: true });
        self
    }

    /// All declared members, properties first.
    pub fn members(&self) -> impl Iterator<Item = (MemberKind, &MemberDecl)> {
        self.properties
            .iter()
            .map(|d| (MemberKind::Property, d))
            .chain(self.fields.iter().map(|d| (MemberKind::Field, d)))
    }
}

/// In-memory metadata for classes and methods.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    classes: HashMap<String, ClassDef>,
    methods: HashMap<(String, String), Arc<MethodDef>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-populated with the built-in types and query operators.
    pub fn with_prelude() -> Self {
        let mut catalog = Self::new();
        crate::prelude::register(&mut catalog);
        catalog
    }

    /// Register a class. Member types naming one of the class's type
    /// parameters are turned into parameter placeholders.
    pub fn add_class(&mut self, mut class: ClassDef) {
        let params = class.type_params.clone();
        for decl in class.properties.iter_mut().chain(class.fields.iter_mut()) {
            decl.ty = decl.ty.promote_params(&params);
        }
        self.classes.insert(class.name.clone(), class);
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// True if the type (or its generic definition) is a declared class.
    pub fn contains(&self, ty: &Type) -> bool {
        self.classes.contains_key(ty.full_name())
    }

    pub fn add_method(&mut self, mut def: MethodDef) -> Arc<MethodDef> {
        def.params = def.params.iter().map(|p| p.promote_params(&def.type_params)).collect();
        def.return_type = def.return_type.promote_params(&def.type_params);
        let key = (def.declaring_type.full_name().to_string(), def.name.clone());
        let def = Arc::new(def);
        self.methods.insert(key, Arc::clone(&def));
        def
    }

    pub fn method(&self, declaring_type: &str, name: &str) -> Option<&Arc<MethodDef>> {
        self.methods.get(&(declaring_type.to_string(), name.to_string()))
    }

    /// Look up a method and close it over `type_args` (empty for non-generic methods).
    pub fn method_ref(&self, declaring_type: &str, name: &str, type_args: Vec<Type>) -> Result<MethodRef, BuildError> {
        let def = self.method(declaring_type, name).ok_or_else(|| BuildError::UnknownMethod {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
        })?;
        if def.type_params.is_empty() && type_args.is_empty() {
            return Ok(MethodRef::new(Arc::clone(def)));
        }
        Ok(MethodRef::make_generic(def, type_args)?)
    }

    fn lookup(&self, ty: &Type, name: &str, kind: MemberKind) -> Option<Member> {
        let class = self.classes.get(ty.full_name())?;
        let decls = match kind {
            MemberKind::Property => &class.properties,
            MemberKind::Field => &class.fields,
        };
        let decl = decls.iter().find(|d| d.name == name)?;
        let bindings: HashMap<String, Type> = class
            .type_params
            .iter()
            .cloned()
            .zip(ty.generic_args().iter().cloned())
            .collect();
        Some(Member {
            declaring_type: ty.clone(),
            name: decl.name.clone(),
            kind,
            ty: decl.ty.substitute_params(&bindings),
            is_static: decl.is_static,
        })
    }
}

impl Reflect for TypeCatalog {
    fn property(&self, ty: &Type, name: &str) -> Option<Member> {
        self.lookup(ty, name, MemberKind::Property)
    }

    fn field(&self, ty: &Type, name: &str) -> Option<Member> {
        self.lookup(ty, name, MemberKind::Field)
    }
}
