use nendo::prelude::*;
use pretty_assertions::assert_eq;

fn schema() -> (Table, Table, Table) {
    let users = Table::from_template("users", "id, name, team_id");
    let teams = Table::from_template("teams", "id name");
    let events = declare_table("events", ["id", "user_id", "kind", "at"]);
    (users, teams, events)
}

#[test]
fn test_report_query() {
    let (users, teams, events) = schema();
    let u = alias(&users, "u");
    let t = alias(&teams, "t");

    let q = Query::new()
        .from_([u
            .join(&t, [t.c("id").eq(u.c("team_id"))])
            .left_outer_join(&events, [events.c("user_id").eq(u.c("id"))])])
        .select([
            Expr::from(alias(t.c("name"), "team")),
            count(events.c("id")).labeled("n"),
        ])
        .where_(events.c("kind").is_in(param("kinds")))
        .group_by([t.c("name")])
        .order_by([t.c("name").asc()]);

    let bindings = Bindings::from_json(r#"{"kinds": ["login", "logout"]}"#).unwrap();
    let (sql, params) = render(&q, &bindings).unwrap();

    assert_eq!(
        sql,
        "SELECT t.name as team, COUNT(events.id) as n \
         FROM users as u JOIN teams as t ON (t.id = u.team_id) \
         LEFT OUTER JOIN events ON (events.user_id = u.id) \
         WHERE (events.kind IN ?) GROUP BY t.name ORDER BY t.name ASC"
    );
    assert_eq!(
        params,
        vec![Value::List(vec![Value::from("login"), Value::from("logout")])]
    );
}

#[test]
fn test_options_from_toml() {
    let (users, _, _) = schema();
    let q = Query::new()
        .from_([&users])
        .select([users.c("id"), users.c("name")])
        .where_(users.c("id").between(1, 10));

    let opts = CompileOptions::from_toml("one_table = true\none_line_sql = false\n").unwrap();
    let (sql, params) = render_with(&q, &Bindings::new(), &opts).unwrap();
    assert_eq!(sql, "SELECT id, name\nFROM users\nWHERE (id BETWEEN 1 AND 10)");
    assert!(params.is_empty());
}

#[test]
fn test_builders_are_immutable() {
    let (users, _, _) = schema();
    let base = Query::new().from_([&users]);
    let by_id = base.select([users.c("id")]);
    let by_name = base.select([users.c("name")]);

    assert_eq!(base.to_sql().unwrap(), "SELECT * FROM users");
    assert_eq!(by_id.to_sql().unwrap(), "SELECT users.id FROM users");
    assert_eq!(by_name.to_sql().unwrap(), "SELECT users.name FROM users");
    assert_eq!(base.select([users.c("id")]), by_id);
}

#[test]
fn test_missing_and_conflicting_names() {
    let (users, teams, _) = schema();

    let err = Query::new()
        .from_([&users])
        .where_(teams.c("id").eq(1))
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::MissingName { ref name, clause: "WHERE" } if name == "teams"));

    let err = Query::new()
        .from_([users.join(&users, [users.c("id").eq(users.c("team_id"))])])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::ConflictName { ref name, .. } if name == "users"));
}

#[test]
fn test_native_boolean_is_rejected() {
    let (users, _, _) = schema();
    let err = users.c("id").eq(1).or(false).unwrap_err();
    assert!(matches!(err, QueryError::InvalidCombination(_)));
    assert!(users.col("nope").is_err());
}

#[test]
fn test_compile_from_many_threads() {
    let (users, _, _) = schema();
    let q = Query::new()
        .from_([&users])
        .select([users.c("id")])
        .where_(users.c("team_id").eq(param("team")));

    let handles: Vec<_> = (0..4)
        .map(|team| {
            let q = q.clone();
            std::thread::spawn(move || {
                let bindings = Bindings::new().bind("team", team);
                render(&q, &bindings).unwrap()
            })
        })
        .collect();

    for (team, handle) in handles.into_iter().enumerate() {
        let (sql, params) = handle.join().unwrap();
        assert_eq!(sql, "SELECT users.id FROM users WHERE (users.team_id = ?)");
        assert_eq!(params, vec![Value::Int(team as i64)]);
    }
}
