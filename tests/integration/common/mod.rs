#![allow(dead_code)]

use std::process::Command;

use exprmap::expr::Lambda;
use exprmap::{ClassDef, Expr, Type, TypeCatalog};

pub fn exprmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_exprmap"))
}

/// The demo catalog plus a source class with a member its destination lacks,
/// and a pair of classes whose ids are fields rather than properties.
pub fn catalog() -> TypeCatalog {
    let mut catalog = exprmap::demo::catalog();
    catalog.add_class(
        ClassDef::new("LegacyFrom")
            .with_property("Id", Type::long())
            .with_property("Retired", Type::bool()),
    );
    catalog.add_class(ClassDef::new("LegacyTo").with_property("Id", Type::long()));
    catalog.add_class(ClassDef::new("RowFrom").with_field("key", Type::long()));
    catalog.add_class(ClassDef::new("RowTo").with_field("key", Type::long()));
    catalog
}

/// The lambda an argument carries, looking through a quote.
pub fn lambda_arg(arg: &Expr) -> &Lambda {
    match arg.as_unary() {
        Some(quote) => quote.operand.as_lambda().expect("quoted lambda"),
        None => arg.as_lambda().expect("lambda argument"),
    }
}

pub fn write_manifest(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("exprmap.toml");
    std::fs::write(&path, text).unwrap();
    path
}

pub const MANIFEST: &str = r#"
[[type]]
name = "Models.ItemFrom"
properties = [{ name = "Id", type = "long" }, { name = "GroupId", type = "long?" }]
fields = [{ name = "code", type = "string" }]

[[type]]
name = "Models.ItemTo"
properties = [{ name = "Id", type = "long" }, { name = "GroupId", type = "long?" }]
fields = [{ name = "code", type = "string" }]

[[substitute]]
from = "Models.ItemFrom"
to = "Models.ItemTo"
"#;
