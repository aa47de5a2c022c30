//! # rowbind
//!
//! A small field-mapping ORM.
//!
//! ## Features
//!
//! - **Declarative fields**: a record type lists its fields once; each field
//!   may rename its column, be the primary key, be auto-generated or required
//! - **Row mapping**: result rows hydrate records through per-field load hooks
//! - **Dynamic WHERE**: grouped predicates joined by AND / OR, values always bound
//! - **Insert-or-update saves**: one `save()` decides between INSERT and UPDATE
//!   and recovers auto-generated keys
//! - **Pluggable drivers**: a PostgreSQL driver over `tokio-postgres` ships built in
//!
//! ## Example
//!
//! ```ignore
//! use rowbind::{Instance, Model, PgDriver, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[orm(primary, auto)]
//!     id: Option<i64>,
//!     #[orm(required)]
//!     name: Option<String>,
//!     #[orm(column = "email_address")]
//!     email: Option<String>,
//! }
//!
//! let users: Model<PgDriver, User> = Model::new(PgDriver::from_env()?, "users")?;
//!
//! // INSERT, then the generated id is read back
//! let mut alice = Instance::new(User { name: Some("alice".into()), ..Default::default() });
//! users.save(&mut alice).await?;
//!
//! // UPDATE, keyed on the primary key
//! alice.email = Some("alice@example.com".into());
//! users.save(&mut alice).await?;
//!
//! // SELECT ... WHERE (name LIKE ?) OR (id > ?)
//! let found = users
//!     .select()
//!     .like([("name", "a%")])
//!     .or()
//!     .gt([("id", 100)])
//!     .rows()
//!     .await?;
//! ```

pub mod condition;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod ident;
pub mod instance;
pub mod mapper;
pub mod model;
pub mod postgres;
pub mod query;
pub mod record;
pub mod save;
pub mod schema;
pub mod sql;
pub mod value;

#[cfg(test)]
mod testing;

pub use condition::{Condition, ConditionBuilder, Group, Join, Op, Terms};
pub use config::{ConnectOptions, KeyBinding, ModelConfig};
pub use driver::{Connection, Driver, ResultSet, Row, Statement};
pub use error::{OrmError, OrmResult};
pub use field::{ColumnOptions, Field, FieldOptions, FieldSpec, normalize};
pub use instance::Instance;
pub use mapper::hydrate;
pub use model::Model;
pub use postgres::{PgConnection, PgDriver, connect};
pub use query::Select;
pub use record::{HookFn, Hooks, Record, assign};
pub use save::{SaveKind, SavePlan};
pub use schema::Schema;
pub use value::{FromValue, Value};

#[cfg(feature = "derive")]
pub use rowbind_derive::Record;
