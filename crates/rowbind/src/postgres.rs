//! PostgreSQL driver over `tokio-postgres`.
//!
//! Statements generated with `?` placeholders are rewritten to `$1, $2, ...`
//! before preparation. [`Value`] binds are coerced to the parameter types the
//! server reports for the prepared statement; a value that cannot be encoded
//! as that type fails the statement instead of being sent as raw bytes.

use crate::config::ConnectOptions;
use crate::driver::{Connection, Driver, ResultSet, Statement};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::error::Error;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, accepts, to_sql_checked};
use tokio_postgres::{Client, NoTls};

/// Driver names accepted by [`connect`].
pub const DRIVER_NAMES: &[&str] = &["postgres", "postgresql", "pg"];

/// Open a connection by driver name.
///
/// Only the PostgreSQL driver is built in; any other name fails with
/// [`OrmError::Connection`].
pub async fn connect(driver_name: &str, options: &ConnectOptions) -> OrmResult<PgConnection> {
    if DRIVER_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(driver_name))
    {
        PgConnection::connect(options).await
    } else {
        Err(OrmError::connection(format!(
            "unknown driver '{driver_name}' (expected one of: {})",
            DRIVER_NAMES.join(", ")
        )))
    }
}

/// Opens [`PgConnection`]s from fixed options.
#[derive(Debug, Clone)]
pub struct PgDriver {
    options: ConnectOptions,
}

impl PgDriver {
    pub fn new(options: ConnectOptions) -> Self {
        Self { options }
    }

    /// Driver configured from `DATABASE_URL`.
    pub fn from_env() -> OrmResult<Self> {
        ConnectOptions::from_env().map(Self::new)
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }
}

impl Driver for PgDriver {
    type Connection = PgConnection;

    fn name(&self) -> &str {
        "postgres"
    }

    async fn connect(&self) -> OrmResult<PgConnection> {
        PgConnection::connect(&self.options).await
    }
}

/// An open PostgreSQL connection.
///
/// The socket is driven by a background task that is aborted when the
/// connection is dropped.
pub struct PgConnection {
    client: Arc<Client>,
    task: JoinHandle<()>,
}

impl PgConnection {
    pub async fn connect(options: &ConnectOptions) -> OrmResult<Self> {
        let mut config: tokio_postgres::Config = options
            .url
            .parse()
            .map_err(|e: tokio_postgres::Error| OrmError::Config(e.to_string()))?;
        if let Some(name) = &options.application_name {
            config.application_name(name);
        }
        if let Some(timeout) = options.connect_timeout {
            config.connect_timeout(timeout);
        }

        let (client, connection) = config.connect(NoTls).await.map_err(OrmError::connection)?;
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(target: "rowbind.sql", error = %e, "connection closed with error");
            }
        });

        Ok(Self {
            client: Arc::new(client),
            task,
        })
    }

    /// The underlying `tokio-postgres` client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for PgConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Connection for PgConnection {
    type Statement = PgStatement;

    async fn prepare(&self, sql: &str) -> OrmResult<PgStatement> {
        let native = rewrite_placeholders(sql);
        let statement = self
            .client
            .prepare(&native)
            .await
            .map_err(OrmError::prepare)?;
        Ok(PgStatement {
            client: Arc::clone(&self.client),
            statement,
            sql: sql.to_string(),
        })
    }
}

/// A statement prepared on a [`PgConnection`].
pub struct PgStatement {
    client: Arc<Client>,
    statement: tokio_postgres::Statement,
    sql: String,
}

impl Statement for PgStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    async fn execute(&mut self, binds: &[Value]) -> OrmResult<ResultSet> {
        let params: Vec<&(dyn ToSql + Sync)> =
            binds.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        let rows = self
            .client
            .query(&self.statement, &params)
            .await
            .map_err(OrmError::execute)?;

        let columns: Vec<String> = self
            .statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let values = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|idx| decode_column(row, idx))
                    .collect::<OrmResult<Vec<_>>>()
            })
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(ResultSet::new(columns, values))
    }
}

/// Rewrite `?` placeholders to `$n`, leaving quoted literals and identifiers alone.
pub fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut quote: Option<char> = None;

    for c in sql.chars() {
        match quote {
            Some(q) => {
                // A doubled quote closes and reopens, which leaves us inside.
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                }
                _ => out.push(c),
            },
        }
    }
    out
}

/// Raw wire bytes of a column whose type has no dedicated decoding.
struct RawColumn(Vec<u8>);

impl<'a> FromSql<'a> for RawColumn {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawColumn(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn decode_column(row: &tokio_postgres::Row, idx: usize) -> OrmResult<Value> {
    fn get<'a, T>(row: &'a tokio_postgres::Row, idx: usize) -> OrmResult<Value>
    where
        T: FromSql<'a> + Into<Value>,
    {
        row.try_get::<_, Option<T>>(idx)
            .map(Value::from)
            .map_err(|e| OrmError::decode(row.columns()[idx].name(), e.to_string()))
    }

    let ty = row.columns()[idx].type_();
    match *ty {
        Type::BOOL => get::<bool>(row, idx),
        Type::INT2 => get::<i16>(row, idx),
        Type::INT4 => get::<i32>(row, idx),
        Type::INT8 => get::<i64>(row, idx),
        Type::OID => get::<u32>(row, idx),
        Type::FLOAT4 => get::<f32>(row, idx),
        Type::FLOAT8 => get::<f64>(row, idx),
        Type::BYTEA => get::<Vec<u8>>(row, idx),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map(|v| Value::from(v.map(|t| t.and_utc())))
            .map_err(|e| OrmError::decode(row.columns()[idx].name(), e.to_string())),
        Type::UUID => get::<uuid::Uuid>(row, idx),
        _ if <String as FromSql<'_>>::accepts(ty) => get::<String>(row, idx),
        _ => row
            .try_get::<_, Option<RawColumn>>(idx)
            .map(|raw| match raw {
                Some(RawColumn(bytes)) => raw_value(ty, bytes),
                None => Value::Null,
            })
            .map_err(|e| OrmError::decode(row.columns()[idx].name(), e.to_string())),
    }
}

/// Value for a column type without dedicated decoding.
///
/// Enum labels travel as UTF-8 text; everything else (numeric, date, arrays,
/// ...) is kept as raw bytes and only fails if a record maps it to a typed
/// attribute.
fn raw_value(ty: &Type, bytes: Vec<u8>) -> Value {
    if matches!(ty.kind(), Kind::Enum(_)) {
        match String::from_utf8(bytes) {
            Ok(label) => Value::Text(label),
            Err(e) => Value::Bytes(e.into_bytes()),
        }
    } else {
        Value::Bytes(bytes)
    }
}

fn mismatch(value: &Value, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {} value to parameter of type {ty}", value.type_name()).into()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match (self, ty) {
            (Value::Null, _) => Ok(IsNull::Yes),
            (Value::Bool(v), &Type::BOOL) => v.to_sql(ty, out),
            (Value::Int(v), &Type::INT2) => i16::try_from(*v)?.to_sql(ty, out),
            (Value::Int(v), &Type::INT4) => i32::try_from(*v)?.to_sql(ty, out),
            (Value::Int(v), &Type::INT8) => v.to_sql(ty, out),
            (Value::Int(v), &Type::OID) => u32::try_from(*v)?.to_sql(ty, out),
            (Value::Int(v), &Type::FLOAT4) => (*v as f32).to_sql(ty, out),
            (Value::Int(v), &Type::FLOAT8) => (*v as f64).to_sql(ty, out),
            (Value::Float(v), &Type::FLOAT4) => (*v as f32).to_sql(ty, out),
            (Value::Float(v), &Type::FLOAT8) => v.to_sql(ty, out),
            (
                Value::Text(v),
                &Type::TEXT | &Type::VARCHAR | &Type::BPCHAR | &Type::NAME | &Type::UNKNOWN,
            ) => v.as_str().to_sql(ty, out),
            (Value::Bytes(v), &Type::BYTEA) => v.as_slice().to_sql(ty, out),
            (Value::Json(v), &Type::JSON | &Type::JSONB) => v.to_sql(ty, out),
            (Value::Timestamp(v), &Type::TIMESTAMP) => v.naive_utc().to_sql(ty, out),
            (Value::Timestamp(v), &Type::TIMESTAMPTZ) => v.to_sql(ty, out),
            (Value::Uuid(v), &Type::UUID) => v.to_sql(ty, out),
            (value, ty) => Err(mismatch(value, ty)),
        }
    }

    accepts!(
        BOOL, INT2, INT4, INT8, OID, FLOAT4, FLOAT8, TEXT, VARCHAR, BPCHAR, NAME, UNKNOWN, BYTEA,
        JSON, JSONB, TIMESTAMP, TIMESTAMPTZ, UUID
    );
    to_sql_checked!();
}
