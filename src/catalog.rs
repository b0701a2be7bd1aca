//! Catalog bootstrap
//!
//! Registers the record database and one external table per model with the
//! query engine, so stored records become queryable with SQL.

use tracing::info;

use crate::config::ServiceConfig;
use crate::observability::{Event, ObservationScope};
use crate::query::{QueryExecutor, QueryResult, Record};
use crate::records::Model;

/// Database every engine provides; DDL for new databases runs against it
pub const BOOTSTRAP_DATABASE: &str = crate::query::DEFAULT_DATABASE;

const JSON_SERDE: &str = "org.openx.data.jsonserde.JsonSerDe";

/// `CREATE DATABASE` for the record bucket
pub fn create_database_sql(database: &str, bucket: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS {}\n  LOCATION 's3://{}/';",
        database, bucket
    )
}

/// `CREATE EXTERNAL TABLE` mapping the model's collection to a JSON table
pub fn create_table_sql(model: &Model, bucket: &str) -> String {
    let schema = model.schema();
    let names = schema.column_names();

    let columns: Vec<String> = names
        .iter()
        .map(|name| {
            let column_type = schema
                .fields
                .get(*name)
                .map(|field| field.field_type.column_type())
                .unwrap_or("STRING");
            format!("  {} {}", name, column_type)
        })
        .collect();

    format!(
        "CREATE EXTERNAL TABLE IF NOT EXISTS {table} (\n{columns}\n)\nROW FORMAT SERDE '{serde}'\nWITH SERDEPROPERTIES ('paths'='{paths}')\nLOCATION 's3://{bucket}/{collection}/';",
        table = model.table(),
        columns = columns.join(",\n"),
        serde = JSON_SERDE,
        paths = names.join(","),
        bucket = bucket,
        collection = model.collection(),
    )
}

/// `SELECT *` over a model's table
pub fn select_all_sql(database: &str, table: &str) -> String {
    format!("SELECT * FROM {}.{}", database, table)
}

/// Idempotently create the database and the model's table.
///
/// Returns the (empty) results of both statements.
pub fn init_schema(
    executor: &QueryExecutor,
    config: &ServiceConfig,
    model: &Model,
) -> QueryResult<(Vec<Record>, Vec<Record>)> {
    let database = config.database_name();
    let scope = ObservationScope::with_context("INIT_SCHEMA", format!("{}.{}", database, model.table()));

    let outcome = executor
        .execute(&create_database_sql(&database, &config.bucket), BOOTSTRAP_DATABASE)
        .and_then(|db_rows| {
            let table_rows = executor.execute(&create_table_sql(model, &config.bucket), &database)?;
            Ok((db_rows, table_rows))
        });

    match outcome {
        Ok(rows) => {
            info!(
                event = %Event::CatalogInitialized,
                database = %database,
                table = model.table(),
                bucket = %config.bucket,
            );
            scope.complete();
            Ok(rows)
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_database_sql() {
        assert_eq!(
            create_database_sql("my_bucket", "my-bucket"),
            "CREATE DATABASE IF NOT EXISTS my_bucket\n  LOCATION 's3://my-bucket/';"
        );
    }

    #[test]
    fn test_create_table_sql_for_user() {
        let sql = create_table_sql(&Model::user(), "records");
        assert!(sql.starts_with("CREATE EXTERNAL TABLE IF NOT EXISTS users (\n  id STRING,\n  birthday STRING,"));
        assert!(sql.contains("'paths'='id,birthday,first_name,last_name'"));
        assert!(sql.contains("ROW FORMAT SERDE 'org.openx.data.jsonserde.JsonSerDe'"));
        assert!(sql.ends_with("LOCATION 's3://records/user/';"));
    }

    #[test]
    fn test_create_table_sql_for_open_model() {
        let sql = create_table_sql(&Model::raw(), "b");
        assert!(sql.contains("(\n  id STRING\n)"));
        assert!(sql.contains("LOCATION 's3://b/raw/'"));
    }

    #[test]
    fn test_select_all_sql() {
        assert_eq!(select_all_sql("db", "users"), "SELECT * FROM db.users");
    }
}
