//! Test doubles: a recording driver and a handful of record types.

use crate::driver::{Connection, Driver, ResultSet, Statement};
use crate::error::{OrmError, OrmResult};
use crate::field::{ColumnOptions, FieldSpec};
use crate::record::{Hooks, Record, assign};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

enum Response {
    Rows(ResultSet),
    FailPrepare(String),
    FailExecute(String),
}

#[derive(Default)]
struct MockState {
    connects: usize,
    fail_connect: Option<String>,
    responses: VecDeque<Response>,
    executed: Vec<(String, Vec<Value>)>,
}

/// Records every executed statement and replays scripted responses.
///
/// Each prepared statement consumes one scripted response (an empty result
/// set when none is queued).
#[derive(Clone, Default)]
pub(crate) struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Queue a result set for the next statement.
    pub fn respond(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.state()
            .responses
            .push_back(Response::Rows(ResultSet::new(columns, rows)));
    }

    /// Queue an empty result set for the next statement.
    pub fn respond_empty(&self) {
        self.state()
            .responses
            .push_back(Response::Rows(ResultSet::empty()));
    }

    pub fn fail_next_prepare(&self, msg: &str) {
        self.state()
            .responses
            .push_back(Response::FailPrepare(msg.to_string()));
    }

    pub fn fail_next_execute(&self, msg: &str) {
        self.state()
            .responses
            .push_back(Response::FailExecute(msg.to_string()));
    }

    pub fn fail_next_connect(&self, msg: &str) {
        self.state().fail_connect = Some(msg.to_string());
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    /// Every executed `(sql, binds)` pair, in order.
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.state().executed.clone()
    }
}

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> OrmResult<MockConnection> {
        let mut state = self.state();
        state.connects += 1;
        if let Some(msg) = state.fail_connect.take() {
            return Err(OrmError::connection(msg));
        }
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl Connection for MockConnection {
    type Statement = MockStatement;

    async fn prepare(&self, sql: &str) -> OrmResult<MockStatement> {
        let response = self.state.lock().unwrap().responses.pop_front();
        match response {
            Some(Response::FailPrepare(msg)) => Err(OrmError::prepare(msg)),
            other => Ok(MockStatement {
                state: Arc::clone(&self.state),
                sql: sql.to_string(),
                response: other,
            }),
        }
    }
}

pub(crate) struct MockStatement {
    state: Arc<Mutex<MockState>>,
    sql: String,
    response: Option<Response>,
}

impl Statement for MockStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    async fn execute(&mut self, binds: &[Value]) -> OrmResult<ResultSet> {
        self.state
            .lock()
            .unwrap()
            .executed
            .push((self.sql.clone(), binds.to_vec()));
        match self.response.take() {
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::FailExecute(msg)) => Err(OrmError::execute(msg)),
            Some(Response::FailPrepare(_)) | None => Ok(ResultSet::empty()),
        }
    }
}

/// `id` and `name`, no flags; primary key resolves to the default `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Plain {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Record for Plain {
    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::name("id"), FieldSpec::name("name")]
    }

    fn get(&self, attr: &str) -> Option<Value> {
        match attr {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
        match attr {
            "id" => self.id = assign(attr, value)?,
            "name" => self.name = assign(attr, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Like [`Plain`] but `id` is an auto-generated primary key.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AutoItem {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Record for AutoItem {
    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::with("id", ColumnOptions::new().primary().auto()),
            FieldSpec::name("name"),
        ]
    }

    fn get(&self, attr: &str) -> Option<Value> {
        match attr {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
        match attr {
            "id" => self.id = assign(attr, value)?,
            "name" => self.name = assign(attr, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Column renames, a required field and an auto key stored as `post_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Post {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
}

impl Record for Post {
    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::with(
                "id",
                ColumnOptions::new().column("post_id").primary().auto(),
            ),
            FieldSpec::with("title", ColumnOptions::new().required()),
            FieldSpec::column("author", "author_name"),
            FieldSpec::name("body"),
        ]
    }

    fn get(&self, attr: &str) -> Option<Value> {
        match attr {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "author" => Some(self.author.clone().into()),
            "body" => Some(self.body.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
        match attr {
            "id" => self.id = assign(attr, value)?,
            "title" => self.title = assign(attr, value)?,
            "author" => self.author = assign(attr, value)?,
            "body" => self.body = assign(attr, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Stores `tags` as a comma-joined string through load/save hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Tagged {
    pub id: Option<i64>,
    pub tags: Vec<String>,
}

fn split_tags(v: Value) -> OrmResult<Value> {
    match v {
        Value::Text(s) => Ok(Value::Json(
            s.split(',')
                .filter(|t| !t.is_empty())
                .map(|t| serde_json::Value::String(t.to_string()))
                .collect(),
        )),
        Value::Null => Ok(Value::Null),
        other => Err(OrmError::invalid_field(format!(
            "tags must be stored as text, found {}",
            other.type_name()
        ))),
    }
}

fn join_tags(v: Value) -> OrmResult<Value> {
    match v {
        Value::Json(serde_json::Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(|t| t.as_str()).collect();
            if parts.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(parts.join(",")))
            }
        }
        other => Ok(other),
    }
}

impl Record for Tagged {
    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::name("id"), FieldSpec::name("tags")]
    }

    fn get(&self, attr: &str) -> Option<Value> {
        match attr {
            "id" => Some(self.id.into()),
            "tags" => Some(Value::Json(self.tags.clone().into())),
            _ => None,
        }
    }

    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
        match attr {
            "id" => self.id = assign(attr, value)?,
            "tags" => {
                let json: serde_json::Value = assign(attr, value)?;
                self.tags = serde_json::from_value(json)
                    .map_err(|e| OrmError::decode(attr, e.to_string()))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn hooks() -> Hooks {
        Hooks::new()
            .on_load("tags", split_tags)
            .on_save("tags", join_tags)
    }
}

/// Declares a `phantom` field without a matching attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Ghost {
    pub id: Option<i64>,
}

impl Record for Ghost {
    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::name("id"), FieldSpec::name("phantom")]
    }

    fn get(&self, attr: &str) -> Option<Value> {
        (attr == "id").then(|| self.id.into())
    }

    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
        if attr != "id" {
            return Ok(false);
        }
        self.id = assign(attr, value)?;
        Ok(true)
    }
}

/// No fields at all.
#[derive(Debug, Default)]
pub(crate) struct Empty;

impl Record for Empty {
    fn field_specs() -> Vec<FieldSpec> {
        Vec::new()
    }

    fn get(&self, _attr: &str) -> Option<Value> {
        None
    }

    fn set(&mut self, _attr: &str, _value: Value) -> OrmResult<bool> {
        Ok(false)
    }
}

/// Two fields marked primary.
#[derive(Debug, Default)]
pub(crate) struct TwoPrimaries;

impl Record for TwoPrimaries {
    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::with("a", ColumnOptions::new().primary()),
            FieldSpec::with("b", ColumnOptions::new().primary()),
        ]
    }

    fn get(&self, _attr: &str) -> Option<Value> {
        None
    }

    fn set(&mut self, _attr: &str, _value: Value) -> OrmResult<bool> {
        Ok(false)
    }
}
