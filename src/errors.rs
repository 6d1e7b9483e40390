//! Error types for the lowering pipeline.

use std::path::PathBuf;

use derive_more::{Display, Error, From};
use tensor_ir::ParseError;

pub type LowerResult<T> = Result<T, LowerError>;

#[derive(Debug, Display, Error, From)]
pub enum LowerError {
    #[display("cannot access {}: {source}", path.display())]
    #[from(ignore)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[display("{_0}")]
    Parse(ParseError),

    #[display("unknown pass `{_0}` (see --list-passes)")]
    #[from(ignore)]
    UnknownPass(#[error(not(source))] String),

    #[display("{} illegal operation(s) remain after lowering: {}", ops.len(), ops.join(", "))]
    #[from(ignore)]
    IllegalOps { ops: Vec<String> },
}

impl LowerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LowerError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = LowerError::UnknownPass("canonicalize".to_owned());
        assert_eq!(err.to_string(), "unknown pass `canonicalize` (see --list-passes)");

        let err = LowerError::IllegalOps {
            ops: vec!["xla_hlo.add at offset 10".to_owned(), "xla_hlo.iota at offset 42".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "2 illegal operation(s) remain after lowering: xla_hlo.add at offset 10, xla_hlo.iota at offset 42"
        );

        let err: LowerError = ParseError {
            message: "trailing input after top-level operation".to_owned(),
            offset: 7,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "parse error at offset 7: trailing input after top-level operation"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        let err = LowerError::io(
            "missing.hlo",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "cannot access missing.hlo: not found");
        assert!(std::error::Error::source(&err).is_some());
    }
}
