use axum::{
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("{0}")]
	Validation(String),
	#[error("Book not found")]
	BookNotFound,
	#[error("Review not found")]
	ReviewNotFound,
	#[error("storage unavailable: {0}")]
	StorageUnavailable(sqlx::Error),
	#[error("storage error: {0}")]
	Storage(sqlx::Error),
}

impl ApiError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
			ApiError::BookNotFound | ApiError::ReviewNotFound => StatusCode::NOT_FOUND,
			ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	// what the client gets to see, storage internals stay in the log
	fn detail(&self) -> String {
		match self {
			ApiError::StorageUnavailable(_) => "Storage unavailable".to_string(),
			ApiError::Storage(_) => "Internal server error".to_string(),
			other => other.to_string(),
		}
	}
}

impl From<sqlx::Error> for ApiError {
	fn from(err: sqlx::Error) -> Self {
		match &err {
			sqlx::Error::PoolTimedOut
			| sqlx::Error::PoolClosed
			| sqlx::Error::WorkerCrashed
			| sqlx::Error::Io(_) => ApiError::StorageUnavailable(err),
			// reviews.book_id points at a book that is gone
			sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::BookNotFound,
			_ => ApiError::Storage(err),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::Validation(rejection.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		ApiError::Validation(rejection.body_text())
	}
}

impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		ApiError::Validation(rejection.body_text())
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub detail: String,
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, %status, "request rejected");
		}
		(status, Json(ErrorBody{ detail: self.detail() })).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes() {
		assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(ApiError::BookNotFound.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(ApiError::ReviewNotFound.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(
			ApiError::from(sqlx::Error::PoolTimedOut).status_code(),
			StatusCode::SERVICE_UNAVAILABLE
		);
		assert_eq!(
			ApiError::from(sqlx::Error::RowNotFound).status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn not_found_detail_matches_wire_format() {
		assert_eq!(ApiError::BookNotFound.detail(), "Book not found");
		assert_eq!(ApiError::ReviewNotFound.detail(), "Review not found");
	}

	#[test]
	fn storage_detail_is_not_leaked() {
		let err = ApiError::from(sqlx::Error::PoolClosed);
		assert_eq!(err.detail(), "Storage unavailable");
		assert!(err.to_string().starts_with("storage unavailable"));
	}

	#[tokio::test]
	async fn foreign_key_violation_is_book_not_found() {
		let pool = crate::sql::connect_in_memory().await.unwrap();
		crate::sql::migrate(&pool).await.unwrap();

		let err = sqlx::query("INSERT INTO reviews (review, rating, book_id) VALUES ('orphan', 1, 42)")
			.execute(&pool).await.unwrap_err();
		let err = ApiError::from(err);
		assert!(matches!(err, ApiError::BookNotFound));
		assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
	}
}
