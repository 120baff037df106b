//! Joins, derived tables, correlation, unions and parameters.

use crate::prelude::*;

#[test]
fn test_left_deep_join_chain() {
    let t1 = declare_table("T1", ["id"]);
    let t2 = declare_table("T2", ["id", "t1_id"]);
    let t3 = declare_table("T3", ["id", "t2_id"]);
    let t4 = declare_table("T4", ["id", "t3_id"]);

    let chain = t1
        .left_outer_join(&t2, [t2.c("t1_id").eq(t1.c("id"))])
        .cross_join(&t3, [t3.c("t2_id").eq(t2.c("id"))])
        .right_outer_join(&t4, [t4.c("t3_id").eq(t3.c("id"))]);
    let q = Query::new().from_([chain]).select([t1.c("id")]);

    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT T1.id FROM T1 LEFT OUTER JOIN T2 ON (T2.t1_id = T1.id) \
         CROSS JOIN T3 ON (T3.t2_id = T2.id) RIGHT OUTER JOIN T4 ON (T4.t3_id = T3.id)"
    );
}

#[test]
fn test_nested_right_join_is_parenthesized() {
    let t1 = declare_table("T1", ["id"]);
    let t2 = declare_table("T2", ["id", "t1_id"]);
    let t3 = declare_table("T3", ["id", "t2_id"]);

    let right = t2.join(&t3, [t3.c("t2_id").eq(t2.c("id"))]);
    let q = Query::new().from_([t1.full_outer_join(right, [t2.c("t1_id").eq(t1.c("id"))])]);
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM T1 FULL OUTER JOIN (T2 JOIN T3 ON (T3.t2_id = T2.id)) ON (T2.t1_id = T1.id)"
    );
}

#[test]
fn test_multiple_on_predicates_are_anded() {
    let t = declare_table("T", ["id", "kind"]);
    let g = declare_table("G", ["t_id", "kind"]);
    let j = t.join(&g, [g.c("t_id").eq(t.c("id")), g.c("kind").eq(t.c("kind"))]);
    assert_eq!(
        Query::new().from_([j]).to_sql().unwrap(),
        "SELECT * FROM T JOIN G ON ((G.t_id = T.id) AND (G.kind = T.kind))"
    );
}

#[test]
fn test_derived_table_reprojection() {
    let tb1 = declare_table("tb1", ["id", "tb2_id"]);
    let tb2 = declare_table("tb2", ["id", "id2"]);

    let sub = Query::new()
        .from_([tb2.join(&tb1, [tb2.c("id").eq(tb1.c("tb2_id"))])])
        .select([tb2.c("id2")]);
    let sub_q = alias(&sub, "sub_q");
    let id2 = sub_q.table("tb2").unwrap().c("id2");

    let q = Query::new()
        .from_([tb1.join(&sub_q, [tb1.c("id").lte(id2)])])
        .select([tb1.c("id")]);

    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT tb1.id FROM tb1 JOIN (SELECT tb2.id2 as tb2_id2 FROM tb2 JOIN tb1 \
         ON (tb2.id = tb1.tb2_id)) as sub_q ON (tb1.id <= sub_q.tb2_id2)"
    );
}

#[test]
fn test_derived_table_with_implicit_projection() {
    let t = declare_table("T", ["id", "pt"]);
    let sub = alias(&Query::new().from_([&t]), "s");
    let q = Query::new().from_([&sub]).select([sub.c("T_pt")]);
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT s.T_pt FROM (SELECT T.id as T_id, T.pt as T_pt FROM T) as s"
    );
}

#[test]
fn test_correlated_scalar_subquery() {
    let customer = declare_table("customer", ["cust_id", "fed_id", "cust_type_cd"]);
    let account = declare_table("account", ["account_id", "cust_id"]);
    let c = alias(&customer, "c");
    let a = alias(&account, "a");

    let inner = Query::new()
        .from_([&a])
        .select([count(star())])
        .where_(a.c("cust_id").eq(c.c("cust_id").correlated()));
    let q = Query::new()
        .from_([&c])
        .select([c.c("cust_id"), c.c("fed_id"), c.c("cust_type_cd")])
        .where_(lit(2).eq(subquery(&inner, None)));

    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT c.cust_id, c.fed_id, c.cust_type_cd FROM customer as c \
         WHERE (2 = (SELECT COUNT(*) FROM account as a WHERE (a.cust_id = c.cust_id)))"
    );
}

#[test]
fn test_correlated_reference_needs_outer_scope() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["t_id"]);
    let inner = Query::new()
        .from_([&g])
        .where_(g.c("t_id").eq(t.c("id").correlated()));

    let err = inner.to_sql().unwrap_err();
    assert!(matches!(err, QueryError::MissingName { ref name, .. } if name == "T"));

    let opts = CompileOptions::builder().validation(false).build();
    assert_eq!(
        inner.to_sql_with_options(&opts).unwrap(),
        "SELECT * FROM G WHERE (G.t_id = T.id)"
    );
}

#[test]
fn test_unfolded_column_renders_whole_subquery() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["t_id", "name"]);
    let inner = Query::new()
        .from_([&g])
        .where_(g.c("t_id").eq(t.c("id").correlated()));
    let sub = subquery(&inner, Some("s"));
    let name = alias(sub.table("G").unwrap().c("name"), "g_name");

    let q = Query::new().from_([&t]).select([t.c("id"), name]);
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT T.id, (SELECT G.name FROM G WHERE (G.t_id = T.id)) as g_name FROM T"
    );
}

#[test]
fn test_bare_union() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let a = Query::new().from_([&t]).select([t.c("id")]);
    let b = Query::new().from_([&g]).select([g.c("id")]);

    assert_eq!(
        a.union(&b).unwrap().to_sql().unwrap(),
        "SELECT T.id FROM T UNION SELECT G.id FROM G"
    );
    assert_eq!(
        a.union_all(&b).unwrap().to_sql().unwrap(),
        "SELECT T.id FROM T UNION ALL SELECT G.id FROM G"
    );
}

#[test]
fn test_filtered_union_becomes_derived_table() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let a = Query::new().from_([&t]).select([t.c("id")]);
    let b = Query::new().from_([&g]).select([g.c("id")]);
    let u = a.union(&b).unwrap();
    let q = u.where_(u.col("id").unwrap().gt(1));

    assert_eq!(
        q.to_sql().unwrap(),
        format!(
            "SELECT * FROM (SELECT T.id FROM T UNION SELECT G.id FROM G) as {} WHERE (id > 1)",
            q.internal_name()
        )
    );
}

#[test]
fn test_union_rejects_foreign_columns() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let h = declare_table("H", ["id"]);
    let a = Query::new().from_([&t]).select([t.c("id")]);
    let b = Query::new().from_([&g]).select([g.c("id")]);
    let u = a.union(&b).unwrap();

    let err = u.select([h.c("id")]).to_sql().unwrap_err();
    assert!(matches!(err, QueryError::MissingName { ref name, clause: "SELECT" } if name == "H"));
    let err = u.where_(h.c("id").gt(1)).to_sql().unwrap_err();
    assert!(matches!(err, QueryError::MissingName { ref name, clause: "WHERE" } if name == "H"));
}

#[test]
fn test_union_as_derived_table() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let a = Query::new().from_([&t]).select([t.c("id")]);
    let b = Query::new().from_([&g]).select([g.c("id")]);
    let d = alias(&a.union(&b).unwrap(), "d");

    let q = Query::new().from_([&d]).select([d.c("T_id")]);
    assert_eq!(
        q.to_sql().unwrap(),
        format!(
            "SELECT d.T_id FROM (SELECT id as T_id FROM \
             (SELECT T.id FROM T UNION SELECT G.id FROM G) as {}) as d",
            d.query().internal_name()
        )
    );
}

#[test]
fn test_union_with_labeled_left_operand() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let a = Query::new().from_([&t]).select([alias(t.c("id"), "k")]);
    let b = Query::new().from_([&g]).select([g.c("id")]);
    let u = a.union(&b).unwrap();

    let q = u.select([u.col("k").unwrap()]);
    assert_eq!(
        q.to_sql().unwrap(),
        format!(
            "SELECT k FROM (SELECT T.id as k FROM T UNION SELECT G.id FROM G) as {}",
            q.internal_name()
        )
    );

    let d = alias(&u, "d");
    let q = Query::new().from_([&d]).select([d.c("k")]);
    assert_eq!(
        q.to_sql().unwrap(),
        format!(
            "SELECT d.k FROM (SELECT k FROM \
             (SELECT T.id as k FROM T UNION SELECT G.id FROM G) as {}) as d",
            d.query().internal_name()
        )
    );
}

#[test]
fn test_union_arity_fails_before_render() {
    let t = declare_table("T", ["id", "pt"]);
    let a = Query::new().from_([&t, &t]);
    let b = Query::new().from_([&t]).select([t.c("id")]);
    // `a` would also fail validation; arity is reported first
    let err = a.union(&b).unwrap_err();
    assert!(matches!(err, QueryError::InvalidArity { left: 4, right: 1 }));
}

#[test]
fn test_parameters_follow_tree_order() {
    let t = declare_table("T", ["a", "b"]);
    let bindings = Bindings::new().bind("k2", "second").bind("k1", "first");

    let q = Query::new()
        .from_([&t])
        .where_(t.c("a").eq(param("k1")) & t.c("b").eq(param("k2")));
    let (sql, params) = render(&q, &bindings).unwrap();
    assert_eq!(sql, "SELECT * FROM T WHERE ((T.a = ?) AND (T.b = ?))");
    assert_eq!(params, vec![Value::from("first"), Value::from("second")]);

    let q = Query::new()
        .from_([&t])
        .where_(t.c("b").eq(param("k2")) & t.c("a").eq(param("k1")));
    let (_, params) = render(&q, &bindings).unwrap();
    assert_eq!(params, vec![Value::from("second"), Value::from("first")]);
}

#[test]
fn test_scoped_parameter_keys() {
    let t = declare_table("T", ["id"]);
    let g = declare_table("G", ["id"]);
    let inner = Query::new().from_([&g]).where_(g.c("id").gt(param("min")));
    let sub = alias(&inner, "sub_q");
    let q = Query::new()
        .from_([t.join(&sub, [t.c("id").eq(sub.c("G_id"))])])
        .where_(t.c("id").gt(param("min")));

    let bindings = Bindings::new().bind("min", 1).bind("sub_q.min", 5);
    let (sql, params) = render(&q, &bindings).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM T JOIN (SELECT G.id as G_id FROM G WHERE (G.id > ?)) as sub_q \
         ON (T.id = sub_q.G_id) WHERE (T.id > ?)"
    );
    assert_eq!(params, vec![Value::Int(5), Value::Int(1)]);

    let (_, params) = render(&q, &Bindings::new().bind("min", 1)).unwrap();
    assert_eq!(params, vec![Value::Int(1), Value::Int(1)]);
}

#[test]
fn test_unbound_parameter() {
    let t = declare_table("T", ["id"]);
    let q = Query::new().from_([&t]).where_(t.c("id").eq(param("id")));
    let err = render(&q, &Bindings::new()).unwrap_err();
    assert!(matches!(err, QueryError::UnboundParameter(ref k) if k == "id"));
}

#[test]
fn test_conflict_stops_rendering() {
    let t = declare_table("T", ["id"]);
    let err = render(&Query::new().from_([&t, &t]), &Bindings::new()).unwrap_err();
    assert!(matches!(err, QueryError::ConflictName { .. }));

    let ok = Query::new().from_([Source::from(&t), Source::from(alias(&t, "T1"))]);
    assert_eq!(ok.to_sql().unwrap(), "SELECT * FROM T, T as T1");
}
