//! Errors returned by sessions and solver backends
use std::io;

use thiserror::Error;

use crate::key::Key;

/// Everything that can go wrong while building, running or reading a session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The model path or the workspace could not be set up
    #[error("cannot initialize session: {0}")]
    Initialization(String),
    /// A symbol with this name was already declared in the input dataset
    #[error("symbol '{0}' is already declared")]
    DuplicateSymbol(String),
    /// The data handed to a `create_*` call is malformed
    #[error("invalid data for '{symbol}': {reason}")]
    Validation {
        /// symbol being declared
        symbol: String,
        /// what is wrong with it
        reason: String,
    },
    /// The solver run failed
    #[error(transparent)]
    Solve(#[from] SolveError),
    /// Results were requested before a successful run
    #[error("no results available: the session has not been run successfully")]
    NotReady,
    /// The session was already run; it can be neither extended nor run again
    #[error("the session has already been run")]
    AlreadyRun,
    /// The output dataset contains no variable with this name
    #[error("unknown variable '{0}'")]
    UnknownSymbol(String),
    /// The variable has no record for this key
    #[error("variable '{symbol}' has no record {key}")]
    UnknownKey {
        /// variable looked up
        symbol: String,
        /// missing key
        key: Key,
    },
}

impl SessionError {
    pub(crate) fn validation(symbol: &str, reason: impl Into<String>) -> Self {
        SessionError::Validation {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of the external solver, or of the plumbing around it
#[derive(Error, Debug)]
pub enum SolveError {
    /// The solver program could not be started
    #[error("cannot run '{command}': {source}")]
    Spawn {
        /// program name
        command: String,
        /// underlying error
        source: io::Error,
    },
    /// Reading or writing the exchange files failed
    #[error("solver file error: {0}")]
    Io(#[from] io::Error),
    /// GAMS stopped with a non-zero return code
    #[error("gams returned {code} ({description})")]
    ReturnCode {
        /// the process exit code
        code: i32,
        /// meaning of the code, see [describe_return_code]
        description: &'static str,
        /// what the process printed, for diagnostics
        output: String,
    },
    /// The process was terminated by a signal
    #[error("'{0}' was terminated before completion")]
    Terminated(String),
    /// The model was solved but the solve did not produce a usable solution
    #[error("model status: {0}")]
    Status(crate::solvers::Status),
    /// Output produced by the solver could not be understood
    #[error("malformed solver output: {0}")]
    MalformedOutput(String),
    /// Any other failure reported by a backend
    #[error("{0}")]
    Other(String),
}

/// Text for the documented GAMS return codes
pub fn describe_return_code(code: i32) -> &'static str {
    match code {
        0 => "normal return",
        2 => "compilation error",
        3 => "execution error",
        4 => "system limits reached",
        5 => "file error",
        6 => "parameter error",
        7 => "licensing error",
        8 => "GAMS system error",
        9 => "GAMS could not be started",
        10 => "out of memory",
        11 => "out of disk",
        _ => "unknown error",
    }
}
