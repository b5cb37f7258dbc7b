//! Active-record behavior against an in-memory database.

use quarry_migrate::SchemaBuilder;
use quarry_orm::{Model, OrmError, Record, Row, SqlValue};
use quarry_sqlite::ConnectionManager;

struct User;

impl Model for User {
    const TABLE: &'static str = "users";
    const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
}

struct Post;

impl Model for Post {
    const TABLE: &'static str = "posts";
    const TIMESTAMPS: bool = false;

    fn fillable() -> &'static [&'static str] {
        &["user_id", "title"]
    }
}

fn db() -> ConnectionManager {
    let config = config::Config::builder()
        .set_override("database.default", "main")
        .unwrap()
        .set_override("database.connections.main.driver", "sqlite")
        .unwrap()
        .set_override("database.connections.main.database", ":memory:")
        .unwrap()
        .build()
        .unwrap();
    let db = ConnectionManager::new(config);

    let schema = SchemaBuilder::new(db.connection().unwrap());
    schema
        .create("users", |table| {
            table.id();
            table.string("name");
            table.string("email").unique();
            table.timestamps();
            table.soft_deletes();
        })
        .unwrap();
    schema
        .create("posts", |table| {
            table.id();
            table.integer("user_id");
            table.string("title");
            table.foreign("user_id").references("id").on("users");
        })
        .unwrap();
    db
}

fn alice() -> Row {
    Row::from_iter([("name", "alice"), ("email", "alice@example.com")])
}

#[test]
fn create_then_find_round_trips() {
    let db = db();
    let created = Record::<User>::create(&db, alice()).unwrap();
    assert_eq!(created.get("id"), Some(&SqlValue::Int(1)));

    let found = Record::<User>::find(&db, 1).unwrap().unwrap();
    assert_eq!(found.get("name"), created.get("name"));
    assert_eq!(found.get("email"), created.get("email"));
    // generated fields came back too
    assert!(found.get("created_at").is_some());
    assert_eq!(found.get("created_at"), found.get("updated_at"));
    assert!(!found.is_dirty());
}

#[test]
fn find_on_missing_id_is_none_and_or_fail_errors() {
    let db = db();
    assert!(Record::<User>::find(&db, 99).unwrap().is_none());
    assert!(matches!(
        Record::<User>::find_or_fail(&db, 99),
        Err(OrmError::NotFound { model: "users" })
    ));
}

#[test]
fn save_on_clean_hydrated_record_issues_nothing() {
    let db = db();
    Record::<User>::create(&db, alice()).unwrap();

    let before = db.table("users").unwrap().get().unwrap();
    let mut found = Record::<User>::find(&db, 1).unwrap().unwrap();
    assert!(found.dirty().is_empty());

    found.save(&db).unwrap();

    // No UPDATE ran: the persisted row is byte-identical, including
    // updated_at.
    let after = db.table("users").unwrap().get().unwrap();
    assert_eq!(before, after);
}

#[test]
fn update_writes_only_changed_columns() {
    let db = db();
    let mut user = Record::<User>::create(&db, alice()).unwrap();

    // Change the email behind the record's back; a full-row UPDATE would
    // clobber it.
    db.table("users")
        .unwrap()
        .where_eq("id", 1)
        .update(Row::from_iter([("email", "external@example.com")]))
        .unwrap();

    user.set("name", "alice b");
    user.save(&db).unwrap();

    let row = db.table("users").unwrap().where_eq("id", 1).first().unwrap().unwrap();
    assert_eq!(row.get_str("name"), Some("alice b"));
    assert_eq!(row.get_str("email"), Some("external@example.com"));
}

#[test]
fn fill_respects_the_whitelist() {
    let db = db();
    Record::<User>::create(&db, alice()).unwrap();

    let post = Record::<Post>::with(Row::from_iter([
        ("user_id", SqlValue::Int(1)),
        ("title", SqlValue::Text("hello".into())),
        ("id", SqlValue::Int(999)),
    ]));
    // "id" is not fillable on Post
    assert!(post.get("id").is_none());
    assert_eq!(post.get("title"), Some(&SqlValue::Text("hello".into())));
}

#[test]
fn set_bypasses_the_whitelist_for_explicit_writes() {
    let mut post = Record::<Post>::new();
    post.set("body", "explicit");
    assert!(post.get("body").is_some());
}

#[test]
fn soft_delete_keeps_the_row_and_restore_clears_it() {
    let db = db();
    let mut user = Record::<User>::create(&db, alice()).unwrap();

    user.delete(&db).unwrap();
    assert!(user.is_trashed());

    let row = db.table("users").unwrap().where_eq("id", 1).first().unwrap().unwrap();
    assert!(row.get_str("deleted_at").is_some());

    user.restore(&db).unwrap();
    assert!(!user.is_trashed());

    let row = db.table("users").unwrap().where_eq("id", 1).first().unwrap().unwrap();
    assert_eq!(row.get("deleted_at"), Some(&SqlValue::Null));
}

#[test]
fn hard_delete_removes_the_row() {
    let db = db();
    Record::<User>::create(&db, alice()).unwrap();
    let mut post = Record::<Post>::create(
        &db,
        Row::from_iter([("user_id", SqlValue::Int(1)), ("title", SqlValue::Text("x".into()))]),
    )
    .unwrap();

    post.delete(&db).unwrap();
    assert!(db.table("posts").unwrap().first().unwrap().is_none());
}

#[test]
fn hard_delete_without_a_key_is_an_error() {
    let db = db();
    let mut post = Record::<Post>::new();
    assert!(matches!(
        post.delete(&db),
        Err(OrmError::MissingPrimaryKey { model: "posts", .. })
    ));
}

#[test]
fn restore_requires_soft_deletes() {
    let db = db();
    let mut post = Record::<Post>::new();
    assert!(matches!(
        post.restore(&db),
        Err(OrmError::SoftDeletesDisabled { model: "posts" })
    ));
}

#[test]
fn relations_follow_conventional_foreign_keys() {
    let db = db();
    let user = Record::<User>::create(&db, alice()).unwrap();
    for title in ["first", "second"] {
        Record::<Post>::create(
            &db,
            Row::from_iter([
                ("user_id", SqlValue::Int(1)),
                ("title", SqlValue::Text(title.into())),
            ]),
        )
        .unwrap();
    }

    let posts: Vec<Record<Post>> = user.has_many(&db, None, None).unwrap();
    assert_eq!(posts.len(), 2);

    let one: Option<Record<Post>> = user.has_one(&db, None, None).unwrap();
    assert_eq!(one.unwrap().get("user_id"), Some(&SqlValue::Int(1)));

    let author: Option<Record<User>> = posts[0].belongs_to(&db, None).unwrap();
    assert_eq!(
        author.unwrap().get("email"),
        Some(&SqlValue::Text("alice@example.com".into()))
    );
}

#[test]
fn all_hydrates_every_row() {
    let db = db();
    Record::<User>::create(&db, alice()).unwrap();
    Record::<User>::create(
        &db,
        Row::from_iter([("name", "bob"), ("email", "bob@example.com")]),
    )
    .unwrap();

    let users = Record::<User>::all(&db).unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| !u.is_dirty()));
}
