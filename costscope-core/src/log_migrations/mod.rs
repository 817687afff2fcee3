//! Log database migrations - embedded SQL files
//!
//! Each migration is a (name, sql) tuple compiled in with include_str!,
//! applied in order and recorded in sys_migrations.

/// All log migrations, in application order
///
/// To add one, create `NNN_description.sql` next to this file and append it here.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
