//! PostgreSQL-backed [`DocumentStore`].
//!
//! All collections share the `documents` table keyed by `(collection, id)`
//! with the record in a `jsonb` body. Filters are rendered by
//! [`json_path`](super::json_path) and evaluated with `jsonb_path_match`,
//! every compared value bound through the `vars` argument. Unique indexes are
//! partial expression indexes restricted to one collection.
//!
//! Sorting uses PostgreSQL's `jsonb` ordering (null < string < number <
//! boolean for scalars); missing fields sort first ascending and last
//! descending.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::SortOrder;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{CollectionError, DocumentSession, DocumentStore, FindOptions};
use crate::domain::{Filter, IndexSpec};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::json_path::{self, InvalidFieldName, JsonPathPredicate};
use super::pool::DbPool;

const INSERT_SQL: &str = "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)";

const FIND_ONE_SQL: &str = r#"
SELECT body FROM documents
WHERE collection = $1 AND jsonb_path_match(body, $2::jsonpath, $3, true)
ORDER BY created_at, id
LIMIT 1
"#;

const COUNT_SQL: &str = r#"
SELECT COUNT(*) AS total FROM documents
WHERE collection = $1 AND jsonb_path_match(body, $2::jsonpath, $3, true)
"#;

const REPLACE_SQL: &str = r#"
UPDATE documents
SET body = jsonb_set($3, '{id}', to_jsonb(id)), updated_at = now()
WHERE collection = $1 AND id = (
    SELECT id FROM documents
    WHERE collection = $1 AND jsonb_path_match(body, $2::jsonpath, $4, true)
    ORDER BY created_at, id
    LIMIT 1
)
"#;

const DELETE_SQL: &str = r#"
DELETE FROM documents
WHERE collection = $1 AND jsonb_path_match(body, $2::jsonpath, $3, true)
"#;

#[derive(QueryableByName)]
struct DocumentRow {
    #[diesel(sql_type = Jsonb)]
    body: Value,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

fn invalid_field(error: InvalidFieldName) -> CollectionError {
    CollectionError::query(error.to_string())
}

fn predicate(filter: &Filter) -> Result<JsonPathPredicate, CollectionError> {
    json_path::render(filter).map_err(invalid_field)
}

fn order_by(options: &FindOptions) -> Result<String, CollectionError> {
    let mut keys = options
        .sort
        .iter()
        .map(|key| {
            let path = json_path::pg_path_literal(&key.field).map_err(invalid_field)?;
            let direction = match key.order {
                SortOrder::Asc => "ASC NULLS FIRST",
                SortOrder::Desc => "DESC NULLS LAST",
            };
            Ok(format!("body #> {path} {direction}"))
        })
        .collect::<Result<Vec<_>, CollectionError>>()?;
    keys.push("created_at".to_owned());
    keys.push("id".to_owned());
    Ok(keys.join(", "))
}

/// `CREATE INDEX` statement for `index` on `collection`.
fn index_ddl(collection: &str, index: &IndexSpec) -> Result<String, CollectionError> {
    let collection = json_path::checked_field(collection).map_err(invalid_field)?;
    if collection.contains('.') || index.fields.is_empty() {
        return Err(CollectionError::index(format!(
            "cannot index {collection} on {:?}",
            index.fields
        )));
    }
    let paths = index
        .fields
        .iter()
        .map(|field| json_path::pg_path_literal(field))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CollectionError::index(err.to_string()))?;

    let expressions: Vec<String> = paths
        .iter()
        .map(|path| {
            if index.sparse {
                format!("(body #> {path})")
            } else {
                format!("(COALESCE(body #> {path}, 'null'::jsonb))")
            }
        })
        .collect();
    let mut predicate = format!("collection = '{collection}'");
    if index.sparse {
        for path in &paths {
            predicate.push_str(&format!(" AND body #> {path} IS NOT NULL"));
        }
    }
    let unique = if index.unique { "UNIQUE " } else { "" };
    Ok(format!(
        "CREATE {unique}INDEX IF NOT EXISTS {name} ON documents ({columns}) WHERE {predicate}",
        name = index.name(collection),
        columns = expressions.join(", "),
    ))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Document store over a Diesel connection pool.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    /// Create a store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn session<'a>(&'a self) -> Result<Box<dyn DocumentSession + 'a>, CollectionError> {
        let conn = self.pool.get().await.map_err(map_pool_error)?;
        Ok(Box::new(DieselSession { conn }))
    }
}

/// One pooled connection, returned to the pool on drop.
struct DieselSession<'a> {
    conn: PooledConnection<'a, AsyncPgConnection>,
}

#[async_trait]
impl DocumentSession for DieselSession<'_> {
    async fn ensure_index(
        &mut self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<(), CollectionError> {
        let ddl = index_ddl(collection, index)?;
        sql_query(ddl)
            .execute(&mut self.conn)
            .await
            .map_err(|err| CollectionError::index(map_diesel_error(err, "ensure index").to_string()))?;
        debug!(collection, index = %index.name(collection), "document index ensured");
        Ok(())
    }

    async fn insert(
        &mut self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), CollectionError> {
        sql_query(INSERT_SQL)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(id)
            .bind::<Jsonb, _>(&document)
            .execute(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert document"))?;
        Ok(())
    }

    async fn find_one(
        &mut self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Value, CollectionError> {
        let JsonPathPredicate { path, vars } = predicate(filter)?;
        let mut rows: Vec<DocumentRow> = sql_query(FIND_ONE_SQL)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(&path)
            .bind::<Jsonb, _>(&vars)
            .load(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "find document"))?;
        rows.pop()
            .map(|row| row.body)
            .ok_or(CollectionError::NotFound)
    }

    async fn count(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError> {
        let JsonPathPredicate { path, vars } = predicate(filter)?;
        let row: CountRow = sql_query(COUNT_SQL)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(&path)
            .bind::<Jsonb, _>(&vars)
            .get_result(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "count documents"))?;
        Ok(u64::try_from(row.total).unwrap_or_default())
    }

    async fn find_many(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        let JsonPathPredicate { path, vars } = predicate(filter)?;
        let query = format!(
            "SELECT body FROM documents \
             WHERE collection = $1 AND jsonb_path_match(body, $2::jsonpath, $3, true) \
             ORDER BY {} LIMIT $4 OFFSET $5",
            order_by(options)?
        );
        let rows: Vec<DocumentRow> = sql_query(query)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(&path)
            .bind::<Jsonb, _>(&vars)
            .bind::<Nullable<BigInt>, _>(options.limit.map(to_i64))
            .bind::<BigInt, _>(to_i64(options.offset))
            .load(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "find documents"))?;
        Ok(rows.into_iter().map(|row| row.body).collect())
    }

    async fn replace_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Value,
    ) -> Result<(), CollectionError> {
        let JsonPathPredicate { path, vars } = predicate(filter)?;
        let replaced = sql_query(REPLACE_SQL)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(&path)
            .bind::<Jsonb, _>(&document)
            .bind::<Jsonb, _>(&vars)
            .execute(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "replace document"))?;
        if replaced == 0 {
            return Err(CollectionError::NotFound);
        }
        Ok(())
    }

    async fn remove(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError> {
        let JsonPathPredicate { path, vars } = predicate(filter)?;
        let removed = sql_query(DELETE_SQL)
            .bind::<Text, _>(collection)
            .bind::<Text, _>(&path)
            .bind::<Jsonb, _>(&vars)
            .execute(&mut self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "remove documents"))?;
        if removed == 0 {
            return Err(CollectionError::NotFound);
        }
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use pagination::SortField;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn dense_unique_index_coalesces_missing_keys() {
        let ddl = index_ddl("company", &IndexSpec::unique(["adminEmailAddress"])).expect("ddl");
        assert_eq!(
            ddl,
            "CREATE UNIQUE INDEX IF NOT EXISTS company_adminemailaddress_uniq ON documents \
             ((COALESCE(body #> '{adminEmailAddress}', 'null'::jsonb))) \
             WHERE collection = 'company'"
        );
    }

    #[rstest]
    fn sparse_index_is_partial_on_present_keys() {
        let ddl = index_ddl("user", &IndexSpec::unique(["username"]).sparse()).expect("ddl");
        assert_eq!(
            ddl,
            "CREATE UNIQUE INDEX IF NOT EXISTS user_username_uniq ON documents \
             ((body #> '{username}')) \
             WHERE collection = 'user' AND body #> '{username}' IS NOT NULL"
        );
    }

    #[rstest]
    #[case("company'; DROP TABLE documents; --")]
    #[case("owner.id")]
    fn hostile_collection_names_are_refused(#[case] collection: &str) {
        assert!(index_ddl(collection, &IndexSpec::unique(["name"])).is_err());
    }

    #[rstest]
    fn order_by_appends_a_stable_tiebreak() {
        let options = FindOptions {
            sort: vec![
                SortField::new("timestamp", SortOrder::Desc),
                SortField::new("owner.id", SortOrder::Asc),
            ],
            ..FindOptions::default()
        };

        assert_eq!(
            order_by(&options).expect("order"),
            "body #> '{timestamp}' DESC NULLS LAST, body #> '{owner,id}' ASC NULLS FIRST, created_at, id"
        );
    }

    #[rstest]
    fn unsafe_sort_fields_are_rejected() {
        let options = FindOptions {
            sort: vec![SortField::new("timestamp DESC; --", SortOrder::Asc)],
            ..FindOptions::default()
        };
        assert!(matches!(order_by(&options), Err(CollectionError::Query { .. })));
    }
}
