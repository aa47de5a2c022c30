//! Load/save hooks example for rowbind
//!
//! Run with: cargo run --example hooks -p rowbind
//!
//! Tags are kept as a trimmed, lowercase list in memory and stored as a
//! single comma-separated TEXT column.

use rowbind::{Instance, Model, OrmError, OrmResult, PgDriver, Record, Value};

fn tags_from_column(v: Value) -> OrmResult<Value> {
    match v {
        Value::Text(s) => Ok(Value::Text(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        )),
        other => Ok(other),
    }
}

fn tags_to_column(v: Value) -> OrmResult<Value> {
    match v {
        Value::Text(s) => {
            let tags: Vec<String> = s
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            if tags.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(tags.join(",")))
            }
        }
        other => Ok(other),
    }
}

#[derive(Debug, Default, Record)]
struct Bookmark {
    #[orm(primary, auto)]
    id: Option<i64>,
    #[orm(required)]
    url: Option<String>,
    #[orm(on_load = "tags_from_column", on_save = "tags_to_column")]
    tags: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), OrmError> {
    dotenvy::dotenv().ok();

    let bookmarks: Model<PgDriver, Bookmark> = Model::new(PgDriver::from_env()?, "bookmarks")?;

    bookmarks
        .execute(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                id BIGSERIAL PRIMARY KEY,
                url TEXT NOT NULL,
                tags TEXT
            )",
            &[],
        )
        .await?;
    bookmarks.execute("DELETE FROM bookmarks", &[]).await?;

    let mut page = Instance::new(Bookmark {
        url: Some("https://www.rust-lang.org".into()),
        tags: Some(" Rust, Lang ,,Home ".into()),
        ..Default::default()
    });
    bookmarks.save(&mut page).await?;
    println!("In memory: {:?}", page.record());

    let stored = bookmarks
        .select()
        .like([("tags", "%rust%")])
        .row()
        .await?;
    println!("From the table: {:?}", stored.as_ref().map(|b| b.record()));

    Ok(())
}
