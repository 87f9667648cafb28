pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Config error: {message}")]
	Config { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
	/// Every enabled retrieval arm failed. Distinct from an empty result set.
	#[error("Search unavailable: {message}")]
	SearchUnavailable { message: String },
}
impl From<mneme_config::Error> for Error {
	fn from(err: mneme_config::Error) -> Self {
		Self::Config { message: err.to_string() }
	}
}

impl From<mneme_providers::Error> for Error {
	fn from(err: mneme_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<mneme_storage::Error> for Error {
	fn from(err: mneme_storage::Error) -> Self {
		match err {
			mneme_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			mneme_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			mneme_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}
