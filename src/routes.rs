use axum::{
	extract::{FromRequest, FromRequestParts, State},
	http::{HeaderValue, Uri},
	response::Redirect,
	routing::{any, get, put},
	Json, Router,
};
use maud::Markup;
use sqlx::SqlitePool;
use tower_http::{
	cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::page;
use crate::queries;
use crate::types::{Book, BookFilter, BookForm, BookParam, Health, Review, ReviewForm, ReviewParam};

#[derive(Clone)]
pub struct ServerState {
	pub db: SqlitePool,
}

// axum's extractors, but failing with ApiError::Validation
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Body<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Param<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Filter<T>(pub T);

pub fn router(state: ServerState, cfg: &Config) -> Router {
	Router::new()
		.route("/", get(display_index))
		.route("/health", get(health))
		.route("/books/", get(read_books).post(create_book))
		.route("/books", any(add_trailing_slash))
		.route("/allbooks/", get(read_all_books))
		.route("/allbooks", any(add_trailing_slash))
		.route("/books/:book_id", put(update_book).delete(delete_book))
		.route("/reviews/:book_id", get(read_reviews).post(create_review))
		.route("/reviews/:book_id/:review_id", put(update_review).delete(delete_review))
		.layer(cors(cfg))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

fn cors(cfg: &Config) -> CorsLayer {
	// credentials rule out the `*` wildcards, so "any" echoes the request back
	let origin = if cfg.cors_origins.is_empty() {
		AllowOrigin::mirror_request()
	} else {
		let origins: Vec<HeaderValue> = cfg.cors_origins.iter()
			.filter_map(|o| match o.parse() {
				Ok(value) => Some(value),
				Err(_) => {
					tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
					None
				}
			})
			.collect();
		AllowOrigin::list(origins)
	};

	CorsLayer::new()
		.allow_origin(origin)
		.allow_methods(AllowMethods::mirror_request())
		.allow_headers(AllowHeaders::mirror_request())
		.allow_credentials(true)
}

// 307 keeps the method and body, so a POST to /books still creates
async fn add_trailing_slash(uri: Uri) -> Redirect {
	let target = match uri.query() {
		Some(query) => format!("{}/?{}", uri.path(), query),
		None => format!("{}/", uri.path()),
	};
	Redirect::temporary(&target)
}

// each handler holds one pooled connection for its single operation;
// dropping it hands the connection back on every path

async fn display_index(State(stt): State<ServerState>) -> Result<Markup> {
	let mut conn = stt.db.acquire().await?;
	let books = queries::get_all_books(&mut conn).await?;
	Ok(page::index(&books))
}

async fn health(State(stt): State<ServerState>) -> Result<Json<Health>> {
	let mut conn = stt.db.acquire().await?;
	sqlx::query("SELECT 1").execute(&mut *conn).await?;
	Ok(Json(Health{ status: "ok", version: env!("CARGO_PKG_VERSION") }))
}

async fn create_book(
	State(stt): State<ServerState>,
	Body(book): Body<BookForm>,
) -> Result<Json<Book>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::add_book(&mut conn, &book).await?))
}

async fn read_books(
	State(stt): State<ServerState>,
	Filter(filter): Filter<BookFilter>,
) -> Result<Json<Vec<Book>>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::get_books(&mut conn, &filter).await?))
}

async fn read_all_books(State(stt): State<ServerState>) -> Result<Json<Vec<Book>>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::get_all_books(&mut conn).await?))
}

async fn update_book(
	State(stt): State<ServerState>,
	Param(param): Param<BookParam>,
	Body(book): Body<BookForm>,
) -> Result<Json<Book>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::update_book(&mut conn, param.book_id, &book).await?))
}

async fn delete_book(
	State(stt): State<ServerState>,
	Param(param): Param<BookParam>,
) -> Result<Json<Book>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::delete_book(&mut conn, param.book_id).await?))
}

async fn create_review(
	State(stt): State<ServerState>,
	Param(param): Param<BookParam>,
	Body(review): Body<ReviewForm>,
) -> Result<Json<Review>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::add_review(&mut conn, param.book_id, &review).await?))
}

async fn read_reviews(
	State(stt): State<ServerState>,
	Param(param): Param<BookParam>,
) -> Result<Json<Vec<Review>>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::get_reviews(&mut conn, param.book_id).await?))
}

async fn update_review(
	State(stt): State<ServerState>,
	Param(param): Param<ReviewParam>,
	Body(review): Body<ReviewForm>,
) -> Result<Json<Review>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::update_review(&mut conn, param.book_id, param.review_id, &review).await?))
}

async fn delete_review(
	State(stt): State<ServerState>,
	Param(param): Param<ReviewParam>,
) -> Result<Json<Review>> {
	let mut conn = stt.db.acquire().await?;
	Ok(Json(queries::delete_review(&mut conn, param.book_id, param.review_id).await?))
}
