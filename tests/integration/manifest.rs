mod common;

use common::{write_manifest, MANIFEST};
use exprmap::{load_manifest, Expr, ManifestError, MatchMode, Reflect, Rewriter, Type};

#[test]
fn loaded_manifest_drives_a_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);
    let manifest = load_manifest(&path).unwrap();
    assert_eq!(manifest.config.mode(), MatchMode::ByName);

    let from = Type::named("Models.ItemFrom");
    let i = Expr::parameter(from.clone(), "i");
    let code = Expr::member(Some(i.clone()), manifest.catalog.field(&from, "code").unwrap()).unwrap();
    let lambda = Expr::lambda(code, vec![i]).unwrap();

    let after = Rewriter::new(&manifest.config, &manifest.catalog).rewrite(&lambda).unwrap();
    assert_eq!(after.to_string(), "(i: Models.ItemTo) => i.code");
    assert_eq!(after.ty(), &Type::func(vec![Type::named("Models.ItemTo")], Type::string()));
}

#[test]
fn generic_class_declarations_are_instantiated() {
    let manifest = exprmap::parse_manifest(
        r#"
[[type]]
name = "Page"
type_params = ["T"]
properties = [{ name = "Items", type = "Enumerable<T>" }, { name = "Total", type = "int" }]
"#,
    )
    .unwrap();
    let page = Type::generic("Page", vec![Type::named("Models.ItemTo")]);
    let items = manifest.catalog.property(&page, "Items").unwrap();
    assert_eq!(items.ty, Type::enumerable(Type::named("Models.ItemTo")));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_manifest(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
    assert!(err.span().is_none());
}

#[test]
fn unknown_fields_are_rejected() {
    let err = exprmap::parse_manifest("[[substitute]]\nfrom = \"string\"\nto = \"string\"\nvia = \"x\"\n").unwrap_err();
    assert!(matches!(err, ManifestError::Toml { .. }));
}

#[test]
fn static_fields_keep_their_flag() {
    let manifest = exprmap::parse_manifest(
        r#"
[[type]]
name = "Settings"
fields = [{ name = "Default", type = "Settings", static = true }]
"#,
    )
    .unwrap();
    let field = manifest.catalog.field(&Type::named("Settings"), "Default").unwrap();
    assert!(field.is_static);
}
