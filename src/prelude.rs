use crate::parser::parse_type;
use crate::reflection::{ClassDef, TypeCatalog};
use crate::types::{MethodDef, Type, NULLABLE, STRING};

pub const QUERYABLE: &str = "Queryable";
pub const ENUMERABLE_OPS: &str = "EnumerableOps";

/// Built-in method signature: (declaring type, name, type params, param types, return type, static).
type Signature = (&'static str, &'static str, &'static [&'static str], &'static [&'static str], &'static str, bool);

const METHODS: &[Signature] = &[
    (QUERYABLE, "Where", &["T"], &["Query<T>", "Expression<Func<T, bool>>"], "Query<T>", true),
    (QUERYABLE, "Select", &["TSource", "TResult"], &["Query<TSource>", "Expression<Func<TSource, TResult>>"], "Query<TResult>", true),
    (
        QUERYABLE,
        "SelectMany",
        &["TSource", "TResult"],
        &["Query<TSource>", "Expression<Func<TSource, Enumerable<TResult>>>"],
        "Query<TResult>",
        true,
    ),
    (QUERYABLE, "DistinctBy", &["TSource", "TKey"], &["Query<TSource>", "Expression<Func<TSource, TKey>>"], "Query<TSource>", true),
    (QUERYABLE, "Count", &["T"], &["Query<T>"], "int", true),
    // Takes a bare delegate rather than a quoted expression.
    (ENUMERABLE_OPS, "Any", &["T"], &["Enumerable<T>", "Func<T, bool>"], "bool", true),
    (STRING, "StartsWith", &[], &["string"], "bool", false),
];

fn signature_type(src: &str) -> Type {
    parse_type(src).expect("prelude signatures must parse")
}

/// Register the built-in classes and query operators.
pub fn register(catalog: &mut TypeCatalog) {
    catalog.add_class(
        ClassDef::new(NULLABLE)
            .with_type_params(["T"])
            .with_property("Value", Type::named("T"))
            .with_property("HasValue", Type::bool()),
    );
    catalog.add_class(ClassDef::new(STRING).with_property("Length", Type::int()));

    for (declaring, name, type_params, params, ret, is_static) in METHODS {
        catalog.add_method(MethodDef {
            declaring_type: Type::named(*declaring),
            name: name.to_string(),
            type_params: type_params.iter().map(|p| p.to_string()).collect(),
            params: params.iter().map(|p| signature_type(p)).collect(),
            return_type: signature_type(ret),
            is_static: *is_static,
        });
    }
}
