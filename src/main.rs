use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table as ComfyTable, presets::UTF8_FULL};
use tablegate::{
    Condition, ConditionGroup, Connection, DataAccessError, Record, Settings, SortOrder,
    SqlStatementEvaluator, SqliteConnection, Statement, StatementEvaluator, Value,
};
use tracing_subscriber::EnvFilter;

/// Inspect a SQLite database through the tablegate statement layer
#[derive(Parser, Debug)]
#[command(name = "tablegate")]
#[command(about = "Browse tables, columns, indexes and rows", long_about = None)]
struct Args {
    /// Config file (defaults to ./tablegate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file, overrides the configured path
    #[arg(short, long)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tables, optionally filtered by a LIKE pattern
    Tables { pattern: Option<String> },
    /// List the columns of a table
    Columns {
        table: String,
        /// Only columns whose name matches this LIKE pattern
        #[arg(long)]
        like: Option<String>,
    },
    /// List the indexes of a table
    Indexes { table: String },
    /// Select rows from a table
    Select {
        table: String,
        /// Filter as FIELD:RELATION:VALUE, e.g. age:>:30 (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,
        /// Ordering as FIELD or FIELD:desc (repeatable)
        #[arg(short, long = "order")]
        order: Vec<String>,
        /// Row window as OFFSET,LENGTH
        #[arg(short, long)]
        limit: Option<String>,
        /// Print the SQL instead of running it
        #[arg(long)]
        sql: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(path) = &args.database {
        settings.database.path.clone_from(path);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (statement, print_only) = build_statement(&args.command)?;

    if print_only {
        let evaluator = SqlStatementEvaluator::new(settings.database.dialect);
        println!("{}", evaluator.evaluate(&statement)?);
        return Ok(());
    }

    let connection = SqliteConnection::open(&settings.database)?;
    let records = connection.query(&statement)?;
    println!("{}", render_records(&records));

    Ok(())
}

fn build_statement(command: &Command) -> Result<(Statement, bool), Box<dyn std::error::Error>> {
    let mut statement = Statement::new();

    match command {
        Command::Tables { pattern } => {
            statement.show_tables(pattern.as_deref())?;
            Ok((statement, false))
        }
        Command::Columns { table, like } => {
            statement.show_columns(table.as_str())?;
            if let Some(pattern) = like {
                statement.where_(Condition::new("Field", "LIKE", pattern.as_str()));
            }
            Ok((statement, false))
        }
        Command::Indexes { table } => {
            statement.show_indexes(table.as_str())?;
            Ok((statement, false))
        }
        Command::Select {
            table,
            filters,
            order,
            limit,
            sql,
        } => {
            statement.from(table.as_str())?;

            if !filters.is_empty() {
                let mut group = ConditionGroup::and();
                for filter in filters {
                    group.add(parse_filter(filter)?);
                }
                statement.where_(group);
            }
            for entry in order {
                let (field, direction) = parse_order(entry)?;
                statement.order_by_dir(field, direction);
            }
            if let Some(window) = limit {
                let (offset, length) = parse_limit(window)?;
                statement.limit(offset, length)?;
            }
            Ok((statement, *sql))
        }
    }
}

/// `FIELD:RELATION:VALUE`; integers are passed as integers.
fn parse_filter(raw: &str) -> Result<Condition, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(field), Some(relation), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("invalid filter '{raw}', expected FIELD:RELATION:VALUE"));
    };
    if field.is_empty() || relation.is_empty() {
        return Err(format!("invalid filter '{raw}', expected FIELD:RELATION:VALUE"));
    }

    let value = value
        .parse::<i64>()
        .map_or_else(|_| Value::from(value), Value::Integer);
    Ok(Condition::new(field, relation, value))
}

fn parse_order(raw: &str) -> Result<(&str, SortOrder), String> {
    match raw.split_once(':') {
        Some((field, direction)) => {
            let direction = direction.parse().map_err(|e: DataAccessError| e.to_string())?;
            Ok((field, direction))
        }
        None => Ok((raw, SortOrder::Asc)),
    }
}

fn parse_limit(raw: &str) -> Result<(i64, i64), String> {
    let invalid = || format!("invalid limit '{raw}', expected OFFSET,LENGTH");
    let (offset, length) = raw.split_once(',').ok_or_else(invalid)?;
    let offset = offset.trim().parse().map_err(|_| invalid())?;
    let length = length.trim().parse().map_err(|_| invalid())?;
    Ok((offset, length))
}

fn render_records(records: &[Record]) -> String {
    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);

    if let Some(first) = records.first() {
        table.set_header(first.keys().map(Cell::new));
    }
    for record in records {
        table.add_row(record.values().map(Cell::new));
    }

    format!("{table}\n({} rows)", records.len())
}
