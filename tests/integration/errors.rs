//! Snapshot tests for error message formatting.
//!
//! Uses insta inline snapshots. Run `cargo insta review` to review changes.

mod common;

use common::catalog;
use exprmap::demo::{self, ITEM_FROM};
use exprmap::parser::parse_type;
use exprmap::{parse_manifest, BinaryOp, Expr, Reflect, Rewriter, SubstitutionConfig, Type, Value};
use insta::assert_snapshot;

#[test]
fn unresolved_member_error() {
    let catalog = catalog();
    let legacy = Type::named("LegacyFrom");
    let p = Expr::parameter(legacy.clone(), "p");
    let retired = Expr::member(Some(p.clone()), catalog.property(&legacy, "Retired").unwrap()).unwrap();
    let lambda = Expr::lambda(retired, vec![p]).unwrap();

    let config = SubstitutionConfig::new().substitute(legacy, Type::named("LegacyTo"));
    let err = Rewriter::new(&config, &catalog).rewrite(&lambda).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"cannot resolve member 'Retired' of 'LegacyFrom': no property or field named 'Retired' on 'LegacyTo'"
    );
}

#[test]
fn unsupported_node_kind_error() {
    let catalog = catalog();
    let f = Expr::parameter(Type::func(vec![Type::long()], Type::long()), "f");
    let call = Expr::invoke(f.clone(), vec![Expr::constant(Value::Int(1))]).unwrap();
    let lambda = Expr::lambda(call, vec![f]).unwrap();

    let err = Rewriter::new(&demo::config(), &catalog).rewrite(&lambda).unwrap_err();
    assert_snapshot!(err.to_string(), @"unsupported expression node kind: Invoke");
}

#[test]
fn ill_typed_rebuild_error() {
    let catalog = catalog();
    let x = Expr::parameter(Type::long(), "x");
    let sum = Expr::binary(BinaryOp::Add, x.clone(), Expr::constant(Value::Int(1))).unwrap();
    let lambda = Expr::lambda(sum, vec![x]).unwrap();

    // Retyping the parameter alone leaves the addition with mismatched operands.
    let config = SubstitutionConfig::new().substitute(Type::long(), Type::string());
    let err = Rewriter::new(&config, &catalog).rewrite(&lambda).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"invalid rewritten node: operator Add requires operands of one type, found 'string' and 'long'"
    );
}

#[test]
fn member_object_mismatch_error() {
    let catalog = catalog();
    let item = Type::named(ITEM_FROM);
    let err = Expr::member(
        Some(Expr::parameter(Type::string(), "s")),
        catalog.property(&item, "Id").unwrap(),
    )
    .unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"object of type 'string' has no member 'Id' declared on 'ItemFrom'"
    );
}

#[test]
fn type_syntax_error() {
    let err = parse_type("Query<long").unwrap_err();
    assert_snapshot!(err.to_string(), @"type syntax error: expected '>', found end of input");
}

#[test]
fn unknown_manifest_type_error() {
    let err = parse_manifest("[[substitute]]\nfrom = \"Missing\"\nto = \"string\"\n").unwrap_err();
    assert_snapshot!(err.to_string(), @"unknown type 'Missing' in substitution");
}
