use std::path::PathBuf;

use thiserror::Error;

/// An item whose embedded record could not be decoded. Never fatal for a batch.
#[derive(Debug, Error)]
pub enum ItemParseError {
    #[error("item text is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("item text is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Problems with user input, detected before any request is sent.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("file is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("file is {size} bytes, the upload limit is {limit} bytes: {path}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("unsupported {kind} extension {extension:?}; allowed: {allowed}")]
    UnsupportedExtension {
        kind: &'static str,
        extension: String,
        allowed: String,
    },

    #[error("message text is empty")]
    EmptyMessage,

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no document has been uploaded or processed yet")]
    NoDocumentLoaded,

    #[error("no chat message has been processed yet")]
    NoChatMessage,

    #[error("no price list has been uploaded yet")]
    NoPriceList,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
