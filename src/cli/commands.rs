//! CLI command implementations
//!
//! Every command loads the configuration, wires the filesystem object store
//! and the catalog mirror engine, and prints one JSON document to stdout.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::api::{ApiRequest, Operation, RecordApi};
use crate::catalog;
use crate::config::ServiceConfig;
use crate::object_store::{LocalBackend, ObjectStore};
use crate::observability::{init_logging, Event};
use crate::query::{MirrorQueryEngine, QueryExecutor};
use crate::records::{Model, RecordStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_event, write_json};

/// Collaborators shared by all commands
#[derive(Debug, Clone)]
pub struct Services {
    pub config: ServiceConfig,
    pub store: Arc<dyn ObjectStore>,
    pub executor: QueryExecutor,
}

impl Services {
    /// Filesystem store under `data_dir`, queried through the mirror engine
    pub fn from_config(config: ServiceConfig) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(LocalBackend::new(config.data_dir.clone()));
        let engine = Arc::new(MirrorQueryEngine::new(
            Arc::clone(&store),
            config.results_bucket.clone(),
        ));
        let executor = QueryExecutor::new(engine, config.results_bucket.clone())
            .with_policy(config.poll_policy());

        Self {
            config,
            store,
            executor,
        }
    }

    pub fn new(config: ServiceConfig, store: Arc<dyn ObjectStore>, executor: QueryExecutor) -> Self {
        Self {
            config,
            store,
            executor,
        }
    }

    /// Request handler for `model`
    pub fn record_api(&self, model: Model) -> RecordApi {
        let records = RecordStore::new(Arc::clone(&self.store), self.config.bucket.clone(), model);
        RecordApi::new(records, self.executor.clone(), self.config.database_name())
    }
}

/// Parse arguments, install logging, run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(cli.log_format).map_err(CliError::Logging)?;

    let config = load_config(cli.config.as_deref())?;
    let output = run_command(Services::from_config(config), cli.command)?;
    write_json(&output)
}

/// Run a command, returning the document to print
pub fn run_command(services: Services, command: Command) -> CliResult<Value> {
    match command {
        Command::InitSchema { model } => init_schema(&services, &model),
        Command::Invoke {
            operation,
            event,
            model,
        } => {
            let event = read_event(event.as_deref())?;
            invoke(&services, operation, event, &model)
        }
        Command::Query { sql, database } => query(&services, &sql, database.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::from_env()?,
    };

    info!(
        event = %Event::ConfigLoaded,
        bucket = %config.bucket,
        results_bucket = %config.results_bucket,
        database = %config.database_name(),
        data_dir = %config.data_dir.display(),
    );
    Ok(config)
}

fn model_named(name: &str) -> CliResult<Model> {
    Model::builtin(name).ok_or_else(|| CliError::UnknownModel(name.to_string()))
}

/// Create the database and the model's table
pub fn init_schema(services: &Services, model: &str) -> CliResult<Value> {
    let model = model_named(model)?;
    let (database_rows, table_rows) = catalog::init_schema(&services.executor, &services.config, &model)?;

    Ok(json!({
        "database": services.config.database_name(),
        "table": model.table(),
        "results": [database_rows, table_rows],
    }))
}

/// Handle one request event; the response envelope is the output even on failure
pub fn invoke(services: &Services, operation: Operation, event: Value, model: &str) -> CliResult<Value> {
    let api = services.record_api(model_named(model)?);

    let response = match ApiRequest::from_event(event) {
        Ok(request) => api.handle(operation, &request),
        Err(e) => crate::api::respond(Err(e)),
    };

    Ok(json!({ "statusCode": response.status_code, "body": response.body }))
}

/// Execute SQL and return the records
pub fn query(services: &Services, sql: &str, database: Option<&str>) -> CliResult<Value> {
    let database = database
        .map(str::to_string)
        .unwrap_or_else(|| services.config.database_name());
    let records = services.executor.execute(sql, &database)?;

    Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
}
