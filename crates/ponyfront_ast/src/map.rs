//! Canonical ordered-map projection of the AST.
//!
//! Every node projects to a `MapValue` whose first entry is `node_type`,
//! followed by the node's attributes in declaration order. Absent optional
//! children project to `Null` rather than being elided, so two projections
//! compare equal only when the trees agree attribute for attribute. This is
//! the structural-equality relation the round-trip tests rely on.

use crate::node::*;
use ponyfront_core::collections::OrderedMap;

/// A language-neutral tree value.
#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    Null,
    Bool(bool),
    Str(String),
    List(Vec<MapValue>),
    Map(OrderedMap<&'static str, MapValue>),
}

/// Projection to the canonical ordered-map form.
pub trait ToOrderedMap {
    fn to_ordered_map(&self) -> MapValue;
}

struct MapBuilder {
    map: OrderedMap<&'static str, MapValue>,
}

impl MapBuilder {
    fn new(node_type: &'static str) -> Self {
        let mut map = OrderedMap::new();
        map.insert("node_type", MapValue::Str(node_type.to_string()));
        Self { map }
    }

    fn field(mut self, key: &'static str, value: MapValue) -> Self {
        self.map.insert(key, value);
        self
    }

    fn build(self) -> MapValue {
        MapValue::Map(self.map)
    }
}

fn opt_str(value: &Option<String>) -> MapValue {
    match value {
        Some(s) => MapValue::Str(s.clone()),
        None => MapValue::Null,
    }
}

fn str_list(items: &[String]) -> MapValue {
    MapValue::List(items.iter().map(|s| MapValue::Str(s.clone())).collect())
}

fn list<T: ToOrderedMap>(items: &[T]) -> MapValue {
    MapValue::List(items.iter().map(ToOrderedMap::to_ordered_map).collect())
}

fn opt<T: ToOrderedMap>(value: &Option<T>) -> MapValue {
    match value {
        Some(v) => v.to_ordered_map(),
        None => MapValue::Null,
    }
}

impl ToOrderedMap for Module {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("module")
            .field("docstring", opt_str(&self.docstring))
            .field("uses", list(&self.uses))
            .field("class_defs", list(&self.class_defs))
            .build()
    }
}

impl ToOrderedMap for Use {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("use")
            .field("id", opt_str(&self.id))
            .field("package", opt_str(&self.package))
            .field("ffidecl", opt(&self.ffi))
            .field("guard", opt(&self.guard))
            .build()
    }
}

impl ToOrderedMap for FfiDecl {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("ffidecl")
            .field("id", MapValue::Str(self.id.clone()))
            .field("typeargs", list(&self.type_args))
            .field("params", list(&self.params))
            .field("varargs", MapValue::Bool(self.varargs))
            .field("partial", MapValue::Bool(self.partial))
            .build()
    }
}

impl ToOrderedMap for ClassDef {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("class_def")
            .field("kind", MapValue::Str(self.kind.spelling().to_string()))
            .field("annotations", str_list(&self.annotations))
            .field("capability", opt_str(&self.capability))
            .field("id", MapValue::Str(self.id.clone()))
            .field("type_params", list(&self.type_params))
            .field("provides", opt(&self.provides))
            .field("docstring", opt_str(&self.docstring))
            .field("fields", list(&self.fields))
            .field("methods", list(&self.methods))
            .build()
    }
}

impl ToOrderedMap for TypeParam {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("typeparam")
            .field("id", MapValue::Str(self.id.clone()))
            .field("constraint", opt(&self.constraint))
            .field("default", opt(&self.default))
            .build()
    }
}

impl ToOrderedMap for Field {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("field")
            .field("kind", MapValue::Str(self.kind.spelling().to_string()))
            .field("id", MapValue::Str(self.id.clone()))
            .field("type", self.ty.to_ordered_map())
            .field("default", opt(&self.default))
            .build()
    }
}

impl ToOrderedMap for Method {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("method")
            .field("kind", MapValue::Str(self.kind.spelling().to_string()))
            .field("annotations", str_list(&self.annotations))
            .field("capability", opt_str(&self.capability))
            .field("id", MapValue::Str(self.id.clone()))
            .field("type_params", list(&self.type_params))
            .field("params", list(&self.params))
            .field("return_type", opt(&self.return_type))
            .field("partial", MapValue::Bool(self.partial))
            .field("docstring", opt_str(&self.docstring))
            .field("guard", opt(&self.guard))
            .field("body", opt(&self.body))
            .build()
    }
}

impl ToOrderedMap for Param {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("param")
            .field("id", MapValue::Str(self.id.clone()))
            .field("type", opt(&self.ty))
            .field("default", opt(&self.default))
            .build()
    }
}

impl ToOrderedMap for Seq {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("seq")
            .field("exprs", list(&self.exprs))
            .field("jump", opt(&self.jump))
            .build()
    }
}

impl ToOrderedMap for Jump {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("jump")
            .field("kind", MapValue::Str(self.kind.spelling().to_string()))
            .field(
                "value",
                match &self.value {
                    Some(seq) => seq.to_ordered_map(),
                    None => MapValue::Null,
                },
            )
            .build()
    }
}

impl IfExpr {
    /// An `elseif` arm projects the same attributes under a different
    /// `node_type`, reflecting its position in the chain.
    fn project(&self, node_type: &'static str) -> MapValue {
        MapBuilder::new(node_type)
            .field("annotations", str_list(&self.annotations))
            .field("condition", self.condition.to_ordered_map())
            .field("then_body", self.then_body.to_ordered_map())
            .field("else", opt(&self.else_branch))
            .build()
    }
}

impl ToOrderedMap for IfExpr {
    fn to_ordered_map(&self) -> MapValue {
        self.project("if")
    }
}

impl ToOrderedMap for IfElse {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            IfElse::Elseif(arm) => arm.project("elseif"),
            IfElse::Else(block) => block.to_ordered_map(),
        }
    }
}

impl IfdefExpr {
    fn project(&self, node_type: &'static str) -> MapValue {
        MapBuilder::new(node_type)
            .field("annotations", str_list(&self.annotations))
            .field("condition", self.condition.to_ordered_map())
            .field("then_body", self.then_body.to_ordered_map())
            .field("else", opt(&self.else_branch))
            .build()
    }
}

impl ToOrderedMap for IfdefExpr {
    fn to_ordered_map(&self) -> MapValue {
        self.project("ifdef")
    }
}

impl ToOrderedMap for IfdefElse {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            IfdefElse::Elseif(arm) => arm.project("elseifdef"),
            IfdefElse::Else(block) => block.to_ordered_map(),
        }
    }
}

impl IftypeExpr {
    fn project(&self, node_type: &'static str) -> MapValue {
        MapBuilder::new(node_type)
            .field("annotations", str_list(&self.annotations))
            .field("sub", self.sub.to_ordered_map())
            .field("super", self.super_.to_ordered_map())
            .field("then_body", self.then_body.to_ordered_map())
            .field("else", opt(&self.else_branch))
            .build()
    }
}

impl ToOrderedMap for IftypeExpr {
    fn to_ordered_map(&self) -> MapValue {
        self.project("iftype")
    }
}

impl ToOrderedMap for IftypeElse {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            IftypeElse::Elseif(arm) => arm.project("elseiftype"),
            IftypeElse::Else(block) => block.to_ordered_map(),
        }
    }
}

impl ToOrderedMap for ElseBlock {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("else")
            .field("annotations", str_list(&self.annotations))
            .field("body", self.body.to_ordered_map())
            .build()
    }
}

impl ToOrderedMap for Case {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("case")
            .field("annotations", str_list(&self.annotations))
            .field("pattern", opt(&self.pattern))
            .field("guard", opt(&self.guard))
            .field("action", opt(&self.action))
            .build()
    }
}

impl ToOrderedMap for NamedArg {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("namedarg")
            .field("id", MapValue::Str(self.id.clone()))
            .field("value", self.value.to_ordered_map())
            .build()
    }
}

impl ToOrderedMap for WithElem {
    fn to_ordered_map(&self) -> MapValue {
        MapBuilder::new("withelem")
            .field("pattern", self.pattern.to_ordered_map())
            .field("initialiser", self.initialiser.to_ordered_map())
            .build()
    }
}

impl ToOrderedMap for IdPattern {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            IdPattern::Name(id) => MapBuilder::new("id")
                .field("id", MapValue::Str(id.clone()))
                .build(),
            IdPattern::Tuple(elems) => MapBuilder::new("idtuple")
                .field("elements", list(elems))
                .build(),
        }
    }
}

impl ToOrderedMap for Expr {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            Expr::Assign { lhs, rhs } => MapBuilder::new("assign")
                .field("lhs", lhs.to_ordered_map())
                .field("rhs", rhs.to_ordered_map())
                .build(),
            Expr::Binop {
                op,
                left,
                right,
                partial,
            } => MapBuilder::new("binop")
                .field("op", MapValue::Str(op.clone()))
                .field("left", left.to_ordered_map())
                .field("right", right.to_ordered_map())
                .field("partial", MapValue::Bool(*partial))
                .build(),
            Expr::Isop { op, left, right } => MapBuilder::new("isop")
                .field("op", MapValue::Str(op.clone()))
                .field("left", left.to_ordered_map())
                .field("right", right.to_ordered_map())
                .build(),
            Expr::AsOp { expr, ty } => MapBuilder::new("asop")
                .field("expr", expr.to_ordered_map())
                .field("type", ty.to_ordered_map())
                .build(),
            Expr::Unary { op, expr } => MapBuilder::new("unary")
                .field("op", MapValue::Str(op.clone()))
                .field("expr", expr.to_ordered_map())
                .build(),
            Expr::Consume { capability, expr } => MapBuilder::new("consume")
                .field("capability", opt_str(capability))
                .field("expr", expr.to_ordered_map())
                .build(),
            Expr::Recover {
                annotations,
                capability,
                body,
            } => MapBuilder::new("recover")
                .field("annotations", str_list(annotations))
                .field("capability", opt_str(capability))
                .field("body", body.to_ordered_map())
                .build(),
            Expr::If(arm) => arm.to_ordered_map(),
            Expr::Ifdef(arm) => arm.to_ordered_map(),
            Expr::Iftype(arm) => arm.to_ordered_map(),
            Expr::Match {
                annotations,
                subject,
                cases,
                else_branch,
            } => MapBuilder::new("match")
                .field("annotations", str_list(annotations))
                .field("subject", subject.to_ordered_map())
                .field("cases", list(cases))
                .field("else", opt(else_branch))
                .build(),
            Expr::While {
                annotations,
                condition,
                body,
                else_branch,
            } => MapBuilder::new("while")
                .field("annotations", str_list(annotations))
                .field("condition", condition.to_ordered_map())
                .field("body", body.to_ordered_map())
                .field("else", opt(else_branch))
                .build(),
            Expr::Repeat {
                annotations,
                body,
                condition,
                else_branch,
            } => MapBuilder::new("repeat")
                .field("annotations", str_list(annotations))
                .field("body", body.to_ordered_map())
                .field("condition", condition.to_ordered_map())
                .field("else", opt(else_branch))
                .build(),
            Expr::For {
                annotations,
                pattern,
                iterator,
                body,
                else_branch,
            } => MapBuilder::new("for")
                .field("annotations", str_list(annotations))
                .field("pattern", pattern.to_ordered_map())
                .field("iterator", iterator.to_ordered_map())
                .field("body", body.to_ordered_map())
                .field("else", opt(else_branch))
                .build(),
            Expr::With {
                annotations,
                elems,
                body,
                else_branch,
            } => MapBuilder::new("with")
                .field("annotations", str_list(annotations))
                .field("elems", list(elems))
                .field("body", body.to_ordered_map())
                .field("else", opt(else_branch))
                .build(),
            Expr::Try {
                annotations,
                body,
                else_branch,
                then_branch,
            } => MapBuilder::new("try")
                .field("annotations", str_list(annotations))
                .field("body", body.to_ordered_map())
                .field("else", opt(else_branch))
                .field("then", opt(then_branch))
                .build(),
            Expr::Local { kind, id, ty } => MapBuilder::new("local")
                .field("kind", MapValue::Str(kind.spelling().to_string()))
                .field("id", MapValue::Str(id.clone()))
                .field("type", opt(ty))
                .build(),
            Expr::Dot { expr, id } => MapBuilder::new("dot")
                .field("expr", expr.to_ordered_map())
                .field("id", MapValue::Str(id.clone()))
                .build(),
            Expr::Tilde { expr, id } => MapBuilder::new("tilde")
                .field("expr", expr.to_ordered_map())
                .field("id", MapValue::Str(id.clone()))
                .build(),
            Expr::Chain { expr, id } => MapBuilder::new("chain")
                .field("expr", expr.to_ordered_map())
                .field("id", MapValue::Str(id.clone()))
                .build(),
            Expr::Qualify { expr, type_args } => MapBuilder::new("qualify")
                .field("expr", expr.to_ordered_map())
                .field("typeargs", list(type_args))
                .build(),
            Expr::Call {
                callee,
                positional,
                named,
                partial,
            } => MapBuilder::new("call")
                .field("callee", callee.to_ordered_map())
                .field("positional", list(positional))
                .field("named", list(named))
                .field("partial", MapValue::Bool(*partial))
                .build(),
            Expr::Reference(id) => MapBuilder::new("reference")
                .field("id", MapValue::Str(id.clone()))
                .build(),
            Expr::This => MapBuilder::new("this").build(),
            Expr::True => MapBuilder::new("true").build(),
            Expr::False => MapBuilder::new("false").build(),
            Expr::Int(text) => MapBuilder::new("int")
                .field("value", MapValue::Str(text.clone()))
                .build(),
            Expr::Float(text) => MapBuilder::new("float")
                .field("value", MapValue::Str(text.clone()))
                .build(),
            Expr::Str(text) => MapBuilder::new("string")
                .field("value", MapValue::Str(text.clone()))
                .build(),
            Expr::Tuple(elems) => MapBuilder::new("tuple")
                .field("elements", list(elems))
                .build(),
            Expr::Array { ty, elems } => MapBuilder::new("array")
                .field("type", opt(ty))
                .field("elements", opt(elems))
                .build(),
            Expr::Object {
                capability,
                provides,
                fields,
                methods,
            } => MapBuilder::new("object")
                .field("capability", opt_str(capability))
                .field("provides", opt(provides))
                .field("fields", list(fields))
                .field("methods", list(methods))
                .build(),
            Expr::FfiCall {
                id,
                type_args,
                positional,
                named,
                partial,
            } => MapBuilder::new("fficall")
                .field("id", MapValue::Str(id.clone()))
                .field("typeargs", list(type_args))
                .field("positional", list(positional))
                .field("named", list(named))
                .field("partial", MapValue::Bool(*partial))
                .build(),
        }
    }
}

impl ToOrderedMap for Type {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            Type::This => MapBuilder::new("thistype").build(),
            Type::Cap(cap) => MapBuilder::new("captype")
                .field("capability", MapValue::Str(cap.clone()))
                .build(),
            Type::Arrow { origin, target } => MapBuilder::new("arrowtype")
                .field("origin", origin.to_ordered_map())
                .field("target", target.to_ordered_map())
                .build(),
            Type::Union(types) => MapBuilder::new("uniontype")
                .field("types", list(types))
                .build(),
            Type::Isect(types) => MapBuilder::new("isecttype")
                .field("types", list(types))
                .build(),
            Type::Tuple(types) => MapBuilder::new("tupletype")
                .field("types", list(types))
                .build(),
            Type::Nominal {
                package,
                id,
                type_args,
                capability,
                cap_modifier,
            } => MapBuilder::new("nominal")
                .field("package", opt_str(package))
                .field("id", MapValue::Str(id.clone()))
                .field("typeargs", list(type_args))
                .field("capability", opt_str(capability))
                .field("cap_modifier", opt_str(cap_modifier))
                .build(),
        }
    }
}

impl ToOrderedMap for TypeArg {
    fn to_ordered_map(&self) -> MapValue {
        match self {
            TypeArg::Type(ty) => ty.to_ordered_map(),
            TypeArg::Literal(expr) => expr.to_ordered_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_comes_first() {
        let module = Module {
            docstring: None,
            uses: vec![],
            class_defs: vec![],
        };
        match module.to_ordered_map() {
            MapValue::Map(map) => {
                let keys: Vec<_> = map.keys().copied().collect();
                assert_eq!(keys, vec!["node_type", "docstring", "uses", "class_defs"]);
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_children_project_to_null() {
        let use_ = Use {
            id: None,
            package: Some("\"collections\"".to_string()),
            ffi: None,
            guard: None,
        };
        match use_.to_ordered_map() {
            MapValue::Map(map) => {
                assert_eq!(map.get(&"id"), Some(&MapValue::Null));
                assert_eq!(map.get(&"ffidecl"), Some(&MapValue::Null));
                assert_eq!(
                    map.get(&"package"),
                    Some(&MapValue::Str("\"collections\"".to_string()))
                );
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_elseif_projects_distinct_node_type() {
        let chain = IfExpr {
            annotations: vec![],
            condition: Seq::single(Expr::True),
            then_body: Seq::single(Expr::Int("1".to_string())),
            else_branch: Some(IfElse::Elseif(Box::new(IfExpr {
                annotations: vec![],
                condition: Seq::single(Expr::False),
                then_body: Seq::single(Expr::Int("2".to_string())),
                else_branch: None,
            }))),
        };
        match chain.to_ordered_map() {
            MapValue::Map(map) => match map.get(&"else") {
                Some(MapValue::Map(inner)) => {
                    assert_eq!(
                        inner.get(&"node_type"),
                        Some(&MapValue::Str("elseif".to_string()))
                    );
                }
                other => panic!("expected elseif map, got {other:?}"),
            },
            other => panic!("expected map, got {other:?}"),
        }
    }
}
