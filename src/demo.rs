//! The item/group example: a query joining items to their groups, written
//! against one pair of model classes and migrated to another.

use crate::config::SubstitutionConfig;
use crate::expr::{BinaryOp, BuildError, Expr};
use crate::prelude::QUERYABLE;
use crate::reflection::{ClassDef, Reflect, TypeCatalog};
use crate::types::Type;

pub const ITEM_FROM: &str = "ItemFrom";
pub const ITEM_TO: &str = "ItemTo";
pub const GROUP_FROM: &str = "GroupFrom";
pub const GROUP_TO: &str = "GroupTo";

fn item_class(name: &str) -> ClassDef {
    ClassDef::new(name)
        .with_property("Id", Type::long())
        .with_property("GroupId", Type::nullable(Type::long()))
}

fn group_class(name: &str) -> ClassDef {
    ClassDef::new(name)
        .with_property("Id", Type::long())
        .with_property("ParentId", Type::nullable(Type::long()))
}

/// Prelude plus both generations of the item and group classes.
pub fn catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::with_prelude();
    catalog.add_class(item_class(ITEM_FROM));
    catalog.add_class(item_class(ITEM_TO));
    catalog.add_class(group_class(GROUP_FROM));
    catalog.add_class(group_class(GROUP_TO));
    catalog
}

pub fn item_config() -> SubstitutionConfig {
    SubstitutionConfig::new().substitute(Type::named(ITEM_FROM), Type::named(ITEM_TO))
}

pub fn group_config() -> SubstitutionConfig {
    SubstitutionConfig::new().substitute(Type::named(GROUP_FROM), Type::named(GROUP_TO))
}

/// Both substitutions in a single table.
pub fn config() -> SubstitutionConfig {
    item_config().substitute(Type::named(GROUP_FROM), Type::named(GROUP_TO))
}

/// `(x, y) => x.SelectMany(i => y.Where(j => i.GroupId == j.Id)).DistinctBy(g => g.Id)`
/// over `Query<ItemFrom>` and `Query<GroupFrom>`.
pub fn query(catalog: &TypeCatalog) -> Result<Expr, BuildError> {
    let item = Type::named(ITEM_FROM);
    let group = Type::named(GROUP_FROM);
    let member = |ty: &Type, name: &str| {
        catalog.property(ty, name).ok_or_else(|| BuildError::UnknownMethod {
            declaring_type: ty.to_string(),
            name: name.to_string(),
        })
    };

    let x = Expr::parameter(Type::query(item.clone()), "x");
    let y = Expr::parameter(Type::query(group.clone()), "y");
    let i = Expr::parameter(item.clone(), "i");
    let j = Expr::parameter(group.clone(), "j");
    let g = Expr::parameter(group.clone(), "g");

    // j => i.GroupId == (long?) j.Id
    let group_id = Expr::member(Some(i.clone()), member(&item, "GroupId")?)?;
    let j_id = Expr::member(Some(j.clone()), member(&group, "Id")?)?;
    let matches = Expr::binary(BinaryOp::Equal, group_id, Expr::convert(j_id, Type::nullable(Type::long()))?)?;
    let predicate = Expr::lambda(matches, vec![j])?;

    let where_ = catalog.method_ref(QUERYABLE, "Where", vec![group.clone()])?;
    let groups_of_item = Expr::call(None, where_, vec![y.clone(), predicate])?;

    // SelectMany wants an Enumerable-returning selector; the body is a Query.
    let selector = Expr::lambda_typed(
        Type::func(vec![item.clone()], Type::enumerable(group.clone())),
        groups_of_item,
        None,
        false,
        vec![i],
    )?;
    let select_many = catalog.method_ref(QUERYABLE, "SelectMany", vec![item, group.clone()])?;
    let groups = Expr::call(None, select_many, vec![x.clone(), selector])?;

    let key = Expr::lambda(Expr::member(Some(g.clone()), member(&group, "Id")?)?, vec![g])?;
    let distinct_by = catalog.method_ref(QUERYABLE, "DistinctBy", vec![group, Type::long()])?;
    let body = Expr::call(None, distinct_by, vec![groups, key])?;

    Expr::lambda(body, vec![x, y])
}
