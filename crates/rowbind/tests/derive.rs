use rowbind::{
    Connection, Driver, Instance, Model, ModelConfig, OrmError, OrmResult, Record, ResultSet, Row,
    SaveKind, SavePlan, Schema, Statement, Value, hydrate,
};
use std::sync::{Arc, Mutex};

fn lowercase(v: Value) -> OrmResult<Value> {
    match v {
        Value::Text(s) => Ok(Value::Text(s.to_lowercase())),
        other => Ok(other),
    }
}

fn reject_blank(v: Value) -> OrmResult<Value> {
    match v {
        Value::Text(s) if s.trim().is_empty() => Err(OrmError::invalid_field("slug is blank")),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Article {
    #[orm(primary, auto)]
    id: Option<i64>,
    #[orm(required)]
    title: Option<String>,
    #[orm(column = "author_name")]
    author: Option<String>,
    #[orm(on_load = "lowercase", on_save = "reject_blank")]
    slug: Option<String>,
    #[orm(skip)]
    cached: Option<String>,
}

#[derive(Debug, Default, Record)]
struct Account {
    #[orm(column = "account_no", primary)]
    number: String,
    balance: i64,
}

#[test]
fn derived_fields_follow_declaration_order() {
    let schema = Schema::of::<Article>().unwrap();
    assert_eq!(schema.column_list(), "id, title, author_name, slug");
    assert_eq!(schema.primary_key(), "id");

    let id = schema.primary_field().unwrap();
    assert!(id.primary && id.auto);
    assert!(schema.fields()[1].required);
    assert_eq!(schema.fields()[2].attr, "author");

    let schema = Schema::of::<Account>().unwrap();
    assert_eq!(schema.primary_key(), "account_no");
}

#[test]
fn derived_get_and_set() {
    let mut a = Article::default();
    assert_eq!(a.get("title"), Some(Value::Null));
    assert_eq!(a.get("cached"), None);
    assert_eq!(a.get("nope"), None);

    assert!(a.set("title", Value::from("hello")).unwrap());
    assert!(!a.set("cached", Value::from("x")).unwrap());
    assert_eq!(a.title.as_deref(), Some("hello"));
    assert_eq!(a.cached, None);

    let err = a.set("id", Value::from("not a number")).unwrap_err();
    assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "id"));
}

#[test]
fn hydrate_applies_load_hook_and_ignores_extra_columns() {
    let schema = Schema::of::<Article>().unwrap();
    let row = Row::from_pairs([
        ("id", Value::Int(3)),
        ("title", Value::from("Rust")),
        ("author_name", Value::from("ann")),
        ("slug", Value::from("Hello-World")),
        ("cached", Value::from("ignored")),
        ("views", Value::Int(99)),
    ]);

    let article: Article = hydrate(&schema, &row).unwrap();
    assert_eq!(
        article,
        Article {
            id: Some(3),
            title: Some("Rust".into()),
            author: Some("ann".into()),
            slug: Some("hello-world".into()),
            cached: None,
        }
    );
}

#[test]
fn non_optional_fields_need_a_value() {
    let schema = Schema::of::<Account>().unwrap();
    let row = Row::from_pairs([("account_no", Value::from("A-1")), ("balance", Value::Null)]);
    let err = hydrate::<Account>(&schema, &row).unwrap_err();
    assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "balance"));
}

#[test]
fn save_plan_for_new_article() {
    let schema = Schema::of::<Article>().unwrap();
    let article = Instance::new(Article {
        title: Some("Rust".into()),
        slug: Some("rust".into()),
        ..Default::default()
    });

    let plan = SavePlan::build(&schema, &ModelConfig::default(), "articles", &article).unwrap();
    assert_eq!(plan.kind(), SaveKind::Insert);
    let (sql, binds) = plan.statement();
    assert_eq!(sql, "INSERT INTO articles (title, slug) VALUES (?, ?)");
    assert_eq!(binds, vec![Value::from("Rust"), Value::from("rust")]);

    let (sql, _) = plan.recovery_statement().unwrap();
    assert_eq!(sql, "SELECT id FROM articles WHERE title = ? AND slug = ? LIMIT 1");
}

#[test]
fn save_hook_errors_abort_the_plan() {
    let schema = Schema::of::<Article>().unwrap();
    let article = Instance::existing(Article {
        id: Some(1),
        title: Some("t".into()),
        slug: Some("  ".into()),
        ..Default::default()
    });
    let err = SavePlan::build(&schema, &ModelConfig::default(), "articles", &article).unwrap_err();
    assert!(matches!(err, OrmError::InvalidFieldSpec(_)));
}

#[test]
fn update_keys_on_renamed_primary() {
    let schema = Schema::of::<Account>().unwrap();
    let account = Instance::existing(Account {
        number: "A-1".into(),
        balance: 10,
    });
    let plan = SavePlan::build(&schema, &ModelConfig::default(), "accounts", &account).unwrap();
    let (sql, binds) = plan.statement();
    assert_eq!(sql, "UPDATE accounts SET balance=? WHERE account_no = 'A-1'");
    assert_eq!(binds, vec![Value::Int(10)]);
}

/// Answers every statement with a fixed result set and records what ran.
#[derive(Clone, Default)]
struct Recorder {
    rows: Arc<Mutex<Vec<ResultSet>>>,
    log: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

struct RecorderStatement {
    sql: String,
    recorder: Recorder,
}

impl Driver for Recorder {
    type Connection = Recorder;

    fn name(&self) -> &str {
        "recorder"
    }

    async fn connect(&self) -> OrmResult<Recorder> {
        Ok(self.clone())
    }
}

impl Connection for Recorder {
    type Statement = RecorderStatement;

    async fn prepare(&self, sql: &str) -> OrmResult<RecorderStatement> {
        Ok(RecorderStatement {
            sql: sql.to_string(),
            recorder: self.clone(),
        })
    }
}

impl Statement for RecorderStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    async fn execute(&mut self, binds: &[Value]) -> OrmResult<ResultSet> {
        self.recorder
            .log
            .lock()
            .unwrap()
            .push((self.sql.clone(), binds.to_vec()));
        let mut rows = self.recorder.rows.lock().unwrap();
        Ok(if rows.is_empty() {
            ResultSet::empty()
        } else {
            rows.remove(0)
        })
    }
}

#[tokio::test]
async fn custom_driver_round_trip() {
    let driver = Recorder::default();
    driver.rows.lock().unwrap().extend([
        ResultSet::empty(),
        ResultSet::new(vec!["id".into()], vec![vec![Value::Int(11)]]),
        ResultSet::new(
            vec!["id".into(), "title".into(), "slug".into()],
            vec![vec![Value::Int(11), Value::from("Rust"), Value::from("RUST")]],
        ),
    ]);
    let articles: Model<Recorder, Article> = Model::new(driver.clone(), "articles").unwrap();

    let mut article = Instance::new(Article {
        title: Some("Rust".into()),
        ..Default::default()
    });
    articles.save(&mut article).await.unwrap();
    assert_eq!(article.id, Some(11));
    assert!(!article.is_new());

    let found = articles
        .select()
        .with([("title", "Rust")])
        .or()
        .like([("slug", "ru%")])
        .row()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.slug.as_deref(), Some("rust"));

    let log = driver.log.lock().unwrap().clone();
    let sqls: Vec<&str> = log.iter().map(|(sql, _)| sql.as_str()).collect();
    assert_eq!(
        sqls,
        vec![
            "INSERT INTO articles (title) VALUES (?)",
            "SELECT id FROM articles WHERE title = ? LIMIT 1",
            "SELECT * FROM articles WHERE (title = ?) OR (slug LIKE ?) LIMIT 1",
        ]
    );
    assert_eq!(log[2].1, vec![Value::from("Rust"), Value::from("ru%")]);
}
