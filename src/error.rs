// src/error.rs
// =============================================================================
// Typed errors shared by the crawler, the search client and the record store.
//
// None of these are fatal for a batch run: the batch drivers log them and
// move on to the next company. main.rs wraps them in anyhow::Error when they
// do need to bubble all the way up.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// Connection failure, timeout or any other transport-level problem
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// The server answered, but not with 200 OK
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The body could not be decoded or did not contain what we expected
    #[error("could not parse {url}: {message}")]
    Parse { url: String, message: String },

    /// The search provider kept answering 429 until we ran out of attempts
    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// A record document is missing its identity fields or is not valid JSON
    #[error("invalid record {}: {message}", path.display())]
    RecordValidation { path: PathBuf, message: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScoutError {
    // Maps a reqwest failure onto our network variant
    //
    // reqwest puts the URL in its own message as well, so we strip it down to
    // the kind of failure to keep log lines short.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "connection failed".to_string()
        } else if error.is_decode() || error.is_body() {
            return ScoutError::Parse {
                url: url.to_string(),
                message: error.to_string(),
            };
        } else {
            error.to_string()
        };

        ScoutError::Network {
            url: url.to_string(),
            message,
        }
    }
}
