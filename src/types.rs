use serde::{Deserialize, Serialize};

pub type Bid = i64;
pub type Rid = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
	pub id: Bid,
	pub title: String,
	pub author: String,
	pub publication_year: i64,
}

// the row also carries book_id, but the response only exposes these three
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Review {
	pub id: Rid,
	pub review: String,
	pub rating: i64,
}

/// Body of `POST /books/` and `PUT /books/{book_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookForm {
	pub title: String,
	pub author: String,
	pub publication_year: i64,
}

/// Body of `POST /reviews/{book_id}` and `PUT /reviews/{book_id}/{review_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewForm {
	pub review: String,
	pub rating: i64,
}

// unknown query keys are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
	pub author: Option<String>,
	pub publication_year: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BookParam {
	pub book_id: Bid,
}

#[derive(Debug, Deserialize)]
pub struct ReviewParam {
	pub book_id: Bid,
	pub review_id: Rid,
}

#[derive(Debug, Serialize)]
pub struct Health {
	pub status: &'static str,
	pub version: &'static str,
}
