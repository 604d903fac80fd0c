//! One function per operation. Each takes the request's connection, so the
//! caller decides how long the session lives.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::error::{ApiError, Result};
use crate::types::{Bid, Book, BookFilter, BookForm, Review, ReviewForm, Rid};

pub async fn add_book(conn: &mut SqliteConnection, book: &BookForm) -> Result<Book> {
	let book = sqlx::query_as::<_, Book>(r#"
INSERT INTO books
	(title, author, publication_year)
VALUES
	(?, ?, ?)
RETURNING id, title, author, publication_year
	"#)
		.bind(&book.title)
		.bind(&book.author)
		.bind(book.publication_year)
		.fetch_one(conn).await?;

	tracing::debug!(id = book.id, "created book");
	Ok(book)
}

pub async fn get_all_books(conn: &mut SqliteConnection) -> Result<Vec<Book>> {
	get_books(conn, &BookFilter::default()).await
}

/// Books matching every filter that is set, by ascending id.
pub async fn get_books(conn: &mut SqliteConnection, filter: &BookFilter) -> Result<Vec<Book>> {
	let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
		"SELECT id, title, author, publication_year FROM books WHERE 1 = 1"
	);
	if let Some(author) = &filter.author {
		query.push(" AND author = ").push_bind(author);
	}
	if let Some(year) = filter.publication_year {
		query.push(" AND publication_year = ").push_bind(year);
	}
	query.push(" ORDER BY id");

	let books = query.build_query_as::<Book>()
		.fetch_all(conn).await?;
	Ok(books)
}

pub async fn book_exists(conn: &mut SqliteConnection, book_id: Bid) -> Result<bool> {
	let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM books WHERE id = ?")
		.bind(book_id)
		.fetch_optional(conn).await?;
	Ok(found.is_some())
}

/// Replaces all three fields; `BookNotFound` leaves storage untouched.
pub async fn update_book(conn: &mut SqliteConnection, book_id: Bid, book: &BookForm) -> Result<Book> {
	let book = sqlx::query_as::<_, Book>(r#"
UPDATE books SET
	title = ?, author = ?, publication_year = ?
WHERE
	id = ?
RETURNING id, title, author, publication_year
	"#)
		.bind(&book.title)
		.bind(&book.author)
		.bind(book.publication_year)
		.bind(book_id)
		.fetch_optional(conn).await?
		.ok_or(ApiError::BookNotFound)?;

	tracing::debug!(id = book.id, "updated book");
	Ok(book)
}

/// Returns the row as it was. Its reviews go with it (ON DELETE CASCADE).
pub async fn delete_book(conn: &mut SqliteConnection, book_id: Bid) -> Result<Book> {
	let book = sqlx::query_as::<_, Book>(
		"DELETE FROM books WHERE id = ? RETURNING id, title, author, publication_year"
	)
		.bind(book_id)
		.fetch_optional(conn).await?
		.ok_or(ApiError::BookNotFound)?;

	tracing::debug!(id = book.id, "deleted book");
	Ok(book)
}

/// Refuses reviews for books that do not exist.
pub async fn add_review(conn: &mut SqliteConnection, book_id: Bid, review: &ReviewForm) -> Result<Review> {
	if !book_exists(&mut *conn, book_id).await? {
		return Err(ApiError::BookNotFound);
	}

	// the foreign key still guards a book deleted in between
	let review = sqlx::query_as::<_, Review>(r#"
INSERT INTO reviews
	(review, rating, book_id)
VALUES
	(?, ?, ?)
RETURNING id, review, rating
	"#)
		.bind(&review.review)
		.bind(review.rating)
		.bind(book_id)
		.fetch_one(conn).await?;

	tracing::debug!(id = review.id, book_id, "created review");
	Ok(review)
}

pub async fn get_reviews(conn: &mut SqliteConnection, book_id: Bid) -> Result<Vec<Review>> {
	let reviews = sqlx::query_as::<_, Review>(
		"SELECT id, review, rating FROM reviews WHERE book_id = ? ORDER BY id"
	)
		.bind(book_id)
		.fetch_all(conn).await?;
	Ok(reviews)
}

/// Only touches the review when it belongs to `book_id`.
pub async fn update_review(
	conn: &mut SqliteConnection,
	book_id: Bid, review_id: Rid, review: &ReviewForm,
) -> Result<Review> {
	let review = sqlx::query_as::<_, Review>(r#"
UPDATE reviews SET
	review = ?, rating = ?
WHERE
	id = ? AND book_id = ?
RETURNING id, review, rating
	"#)
		.bind(&review.review)
		.bind(review.rating)
		.bind(review_id)
		.bind(book_id)
		.fetch_optional(conn).await?
		.ok_or(ApiError::ReviewNotFound)?;

	tracing::debug!(id = review.id, book_id, "updated review");
	Ok(review)
}

pub async fn delete_review(conn: &mut SqliteConnection, book_id: Bid, review_id: Rid) -> Result<Review> {
	let review = sqlx::query_as::<_, Review>(
		"DELETE FROM reviews WHERE id = ? AND book_id = ? RETURNING id, review, rating"
	)
		.bind(review_id)
		.bind(book_id)
		.fetch_optional(conn).await?
		.ok_or(ApiError::ReviewNotFound)?;

	tracing::debug!(id = review.id, book_id, "deleted review");
	Ok(review)
}
