//! Event log database migrations
//!
//! Same layout as the storage migrations, applied to `logs.duckdb`.

/// Log migrations in application order.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
