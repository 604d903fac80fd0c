use std::str::FromStr;

use sqlx::{
	sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
	Executor,
};

use crate::config::Config;

// (version, name, statements); append only, never edit an applied entry
const MIGRATIONS: &[(i64, &str, &str)] = &[
	(1, "books_and_reviews", r#"
CREATE TABLE IF NOT EXISTS books (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL,
	author TEXT NOT NULL,
	publication_year INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_books_title ON books(title);
CREATE INDEX IF NOT EXISTS ix_books_author ON books(author);
CREATE INDEX IF NOT EXISTS ix_books_publication_year ON books(publication_year);

CREATE TABLE IF NOT EXISTS reviews (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	review TEXT NOT NULL,
	rating INTEGER NOT NULL,
	book_id INTEGER NOT NULL,
	FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS ix_reviews_book_id ON reviews(book_id);
"#),
];

pub async fn connect(cfg: &Config) -> Result<SqlitePool, sqlx::Error> {
	let opts = SqliteConnectOptions::from_str(&cfg.database_url)?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(cfg.max_connections)
		.acquire_timeout(cfg.acquire_timeout)
		.connect_with(opts).await
}

// every pooled connection to :memory: is its own database, so keep exactly one
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
	let opts = SqliteConnectOptions::from_str("sqlite::memory:")?
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(opts).await
}

/// Applies the migrations not yet recorded in `_migrations`.
/// Existing tables and rows are left alone.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
	pool.execute(r#"
CREATE TABLE IF NOT EXISTS _migrations (
	version INTEGER NOT NULL PRIMARY KEY,
	name TEXT NOT NULL,
	applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
	"#).await?;

	for &(version, name, statements) in MIGRATIONS {
		let applied: Option<i64> = sqlx::query_scalar("SELECT version FROM _migrations WHERE version = ?")
			.bind(version)
			.fetch_optional(pool).await?;
		if applied.is_some() {
			continue;
		}

		let mut tx = pool.begin().await?;
		(&mut *tx).execute(statements).await?;
		sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
			.bind(version)
			.bind(name)
			.execute(&mut *tx).await?;
		tx.commit().await?;
		tracing::info!(version, name, "applied migration");
	}

	Ok(())
}
