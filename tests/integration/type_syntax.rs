use exprmap::parser::parse_type;
use exprmap::Type;

#[test]
fn nested_generics() {
    let ty = parse_type("Expression<Func<Models.ItemFrom, Enumerable<Models.GroupFrom>>>").unwrap();
    assert_eq!(
        ty,
        Type::expression(Type::func(
            vec![Type::named("Models.ItemFrom")],
            Type::enumerable(Type::named("Models.GroupFrom")),
        ))
    );
    assert_eq!(ty.name(), "Expression");
}

#[test]
fn nullable_suffix_desugars() {
    assert_eq!(parse_type("long?").unwrap(), Type::nullable(Type::long()));
    assert_eq!(
        parse_type("Query<long?>").unwrap(),
        Type::query(Type::nullable(Type::long()))
    );
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(
        parse_type("  Func < long ,bool > ").unwrap(),
        Type::func(vec![Type::long()], Type::bool())
    );
}

#[test]
fn types_parse_through_from_str() {
    let ty: Type = "Query<Models.ItemTo>".parse().unwrap();
    assert_eq!(ty, Type::query(Type::named("Models.ItemTo")));
}

#[test]
fn rejects_malformed_input() {
    for src in ["", "<long>", "Query<>", "Query<long,>", "long??", "Query<long>>", "1abc"] {
        assert!(parse_type(src).is_err(), "expected '{src}' to be rejected");
    }
}
