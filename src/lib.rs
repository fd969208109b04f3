pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod expr;
pub mod reflection;
pub mod prelude;
pub mod config;
pub mod manifest;
pub mod rewrite;
pub mod demo;

pub use config::{MatchMode, SubstitutionConfig};
pub use diagnostics::{RewriteError, TypeSyntaxError};
pub use expr::{BinaryOp, BuildError, Expr, ExprKind, NodeKind, UnaryOp, Value};
pub use manifest::{load_manifest, parse_manifest, Manifest, ManifestError};
pub use reflection::{ClassDef, Reflect, TypeCatalog};
pub use rewrite::{visit, IdentityMemo, Rewriter};
pub use types::{Member, MemberKind, MethodDef, MethodRef, Type};

/// Rewrite `expr` once per configuration, feeding each pass the previous
/// pass's output. Each stage is an independent top-level pass.
pub fn rewrite_staged(
    expr: &Expr,
    stages: &[&SubstitutionConfig],
    reflect: &dyn Reflect,
) -> Result<Expr, RewriteError> {
    stages
        .iter()
        .try_fold(expr.clone(), |current, config| Rewriter::new(config, reflect).rewrite(&current))
}
