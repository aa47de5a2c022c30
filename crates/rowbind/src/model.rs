//! Table-bound model: schema, lazily opened connection, statement execution.

use crate::condition::ConditionBuilder;
use crate::config::ModelConfig;
use crate::driver::{Connection, Driver, ResultSet, Row, Statement};
use crate::error::{OrmError, OrmResult};
use crate::ident::check_table;
use crate::instance::Instance;
use crate::mapper::hydrate;
use crate::query::Select;
use crate::record::Record;
use crate::save;
use crate::schema::Schema;
use crate::sql::QueryType;
use crate::value::Value;
use std::marker::PhantomData;
use tokio::sync::OnceCell;

/// Binds record type `R` to a table reached through driver `D`.
///
/// The connection is opened on first use and reused for the model's
/// lifetime; dropping the model releases it.
///
/// # Example
///
/// ```ignore
/// let users: Model<PgDriver, User> = Model::new(PgDriver::from_env()?, "users")?;
///
/// let mut alice = Instance::new(User { name: Some("alice".into()), ..Default::default() });
/// users.save(&mut alice).await?;
///
/// let found = users.select().with([("name", "alice")]).row().await?;
/// ```
pub struct Model<D: Driver, R: Record> {
    driver: D,
    table: String,
    schema: Schema,
    config: ModelConfig,
    conn: OnceCell<D::Connection>,
    _record: PhantomData<fn() -> R>,
}

impl<D: Driver, R: Record> Model<D, R> {
    /// Register `R` against `table` with the default configuration.
    pub fn new(driver: D, table: impl Into<String>) -> OrmResult<Self> {
        Self::with_config(driver, table, ModelConfig::default())
    }

    /// Register `R` against `table`. The schema of `R` is resolved here, once.
    pub fn with_config(driver: D, table: impl Into<String>, config: ModelConfig) -> OrmResult<Self> {
        let table = table.into();
        check_table(&table)?;
        let schema = Schema::resolve::<R>(&config)?;
        Ok(Self {
            driver,
            table,
            schema,
            config,
            conn: OnceCell::new(),
            _record: PhantomData,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether the connection has been opened yet.
    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    /// The model's connection, opened on first call.
    pub async fn connection(&self) -> OrmResult<&D::Connection> {
        self.conn
            .get_or_try_init(|| async {
                let conn = self.driver.connect().await?;
                tracing::debug!(
                    target: "rowbind.sql",
                    driver = self.driver.name(),
                    table = %self.table,
                    "connection established"
                );
                Ok::<_, OrmError>(conn)
            })
            .await
    }

    /// Prepare and execute one statement on the model's connection.
    pub async fn execute(&self, sql: &str, binds: &[Value]) -> OrmResult<ResultSet> {
        let conn = self.connection().await?;
        tracing::debug!(
            target: "rowbind.sql",
            query_type = ?QueryType::from_sql(sql),
            table = %self.table,
            param_count = binds.len(),
            sql = %sql,
        );
        let mut stmt = conn.prepare(sql).await?;
        let rows = stmt.execute(binds).await?;
        tracing::trace!(target: "rowbind.sql", rows = rows.len(), "statement finished");
        Ok(rows)
    }

    /// Start a SELECT over this model's table.
    pub fn select(&self) -> Select<'_, D, R> {
        Select::new(self, ConditionBuilder::new())
    }

    /// Start a SELECT from an existing condition builder.
    pub fn select_where(&self, conditions: ConditionBuilder) -> Select<'_, D, R> {
        Select::new(self, conditions)
    }

    /// Fetch the row whose primary key equals `key`.
    pub async fn find(&self, key: impl Into<Value>) -> OrmResult<Option<Instance<R>>> {
        let pk = self.schema.primary_key().to_string();
        self.select().with([(pk, key.into())]).row().await
    }

    /// Fetch every row of the table.
    pub async fn all(&self) -> OrmResult<Vec<Instance<R>>> {
        self.select().rows().await
    }

    /// Build an existing instance from a fetched row.
    pub fn hydrate(&self, row: &Row) -> OrmResult<Instance<R>> {
        hydrate::<R>(&self.schema, row).map(Instance::existing)
    }

    /// Insert or update `instance`.
    ///
    /// See [`crate::save`] for the resolution rules. On success `instance`
    /// is no longer new; for inserts with an auto-generated key the key
    /// attribute holds the recovered value.
    pub async fn save(&self, instance: &mut Instance<R>) -> OrmResult<()> {
        save::save(self, instance).await
    }
}

impl<D: Driver, R: Record> std::fmt::Debug for Model<D, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("driver", &self.driver.name())
            .field("table", &self.table)
            .field("schema", &self.schema)
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
