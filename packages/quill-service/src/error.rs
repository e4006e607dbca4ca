#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<quill_storage::Error> for Error {
	fn from(err: quill_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
