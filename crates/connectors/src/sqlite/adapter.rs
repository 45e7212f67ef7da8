use crate::{
    error::AdapterError,
    sqlite::{params::to_sql_values, row::decode_row},
};
use async_trait::async_trait;
use model::{
    core::value::Value,
    pagination::cursor::SortDirection,
    records::row::RowData,
    schema::entity::EntitySchema,
};
use planner::{
    pagination::{adapter::QueryAdapter, predicate::Predicate},
    query::{
        ast::{
            common::{OrderDir, TableRef},
            select::Select,
        },
        builder::{create_table::CreateTableBuilder, insert::InsertBuilder, select::SelectBuilder},
        dialect::{self, Dialect},
        ident,
        renderer::render_ast,
        value,
    },
};
use rusqlite::{Connection, params_from_iter};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info};

const INSERT_CHUNK_ROWS: usize = 200;

/// Shared handle to one SQLite database.
///
/// Cloning is cheap; clones share the connection, and every statement runs
/// while holding its lock.
#[derive(Clone)]
pub struct SqliteAdapter {
    conn: Arc<Mutex<Connection>>,
    dialect: dialect::Sqlite,
}

impl SqliteAdapter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, AdapterError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        SqliteAdapter {
            conn: Arc::new(Mutex::new(conn)),
            dialect: dialect::Sqlite,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AdapterError> {
        self.conn.lock().map_err(|_| AdapterError::LockPoisoned)
    }

    /// Creates `table` with one non-null column per schema field.
    pub fn create_table(
        &self,
        table: &str,
        schema: &EntitySchema,
        primary_key: &[&str],
    ) -> Result<(), AdapterError> {
        let ast = CreateTableBuilder::from_schema(TableRef::new(table), schema)
            .if_not_exists()
            .primary_key(primary_key)
            .build();
        let (sql, _) = render_ast(&ast, &self.dialect);

        debug!(%sql, dialect = %self.dialect.name(), "Creating table");
        self.lock()?.execute_batch(&sql)?;
        Ok(())
    }

    /// Inserts `rows` into `table` in a single transaction. Fields the schema
    /// declares but a row lacks are written as NULL.
    pub fn insert_rows(
        &self,
        table: &str,
        schema: &EntitySchema,
        rows: &[RowData],
    ) -> Result<usize, AdapterError> {
        let columns = schema.column_names();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let ast = chunk
                .iter()
                .fold(
                    InsertBuilder::new(TableRef::new(table)).columns(&columns),
                    |builder, row| {
                        builder.values(
                            columns
                                .iter()
                                .map(|column| value(row.get_value(column)))
                                .collect(),
                        )
                    },
                )
                .build();

            let (sql, params) = render_ast(&ast, &self.dialect);
            inserted += tx.execute(&sql, params_from_iter(to_sql_values(params)?))?;
        }

        tx.commit()?;
        info!(table, rows = inserted, "Inserted rows");
        Ok(inserted)
    }

    /// Starts a query over `table`, reading rows as `schema` declares them.
    pub fn query(&self, table: &str, schema: &EntitySchema) -> SqliteQuery {
        SqliteQuery {
            adapter: self.clone(),
            table: TableRef::new(table),
            schema: schema.clone(),
            conditions: Vec::new(),
            orderings: Vec::new(),
            limit: None,
        }
    }
}

/// One SELECT against a [`SqliteAdapter`], assembled through
/// [`QueryAdapter`] and executed once per page.
pub struct SqliteQuery {
    adapter: SqliteAdapter,
    table: TableRef,
    schema: EntitySchema,
    conditions: Vec<Predicate>,
    orderings: Vec<(String, SortDirection)>,
    limit: Option<usize>,
}

impl SqliteQuery {
    /// The statement as it stands, selecting every schema field in
    /// declaration order. Compared values are bound as their column's
    /// declared type.
    pub fn select(&self) -> Result<Select, AdapterError> {
        let columns = self.schema.fields.iter().map(|f| ident(&f.name)).collect();
        let mut builder = SelectBuilder::new()
            .select(columns)
            .from(self.table.clone());

        for condition in &self.conditions {
            if let Some(expr) = self.bind_types(condition)?.to_expr() {
                builder = builder.where_clause(expr);
            }
        }

        for (column, direction) in &self.orderings {
            builder = builder.order_by(ident(column), Some(OrderDir::from(*direction)));
        }

        if let Some(limit) = self.limit {
            builder = builder.limit(value(Value::Uint(limit as u64)));
        }

        Ok(builder.build())
    }

    /// Untyped cursors carry uuids, dates and timestamps as text.
    fn bind_types(&self, condition: &Predicate) -> Result<Predicate, AdapterError> {
        condition.try_map_values(&mut |column, value| match self.schema.data_type(column) {
            Some(data_type) => value.clone().coerce(data_type).map_err(AdapterError::Encode),
            None => Ok(value.clone()),
        })
    }

    fn check_columns(&self) -> Result<(), AdapterError> {
        match self
            .orderings
            .iter()
            .find(|(column, _)| self.schema.get(column).is_none())
        {
            Some((column, _)) => Err(AdapterError::UnknownColumn {
                entity: self.schema.name.clone(),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QueryAdapter for SqliteQuery {
    type Row = RowData;
    type Error = AdapterError;

    fn add_condition(&mut self, predicate: &Predicate) {
        self.conditions.push(predicate.clone());
    }

    fn add_order(&mut self, column: &str, direction: SortDirection) {
        self.orderings.push((column.to_string(), direction));
    }

    fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    async fn execute(&self) -> Result<Vec<RowData>, AdapterError> {
        self.check_columns()?;

        let (sql, params) = render_ast(&self.select()?, &self.adapter.dialect);
        debug!(%sql, params = params.len(), "Executing page query");
        let params = to_sql_values(params)?;

        let conn = self.adapter.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(decode_row(row, &self.schema)?);
        }
        Ok(out)
    }
}
