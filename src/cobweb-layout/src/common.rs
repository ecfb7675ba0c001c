// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DoesNotExist, // the referenced node doesn't exist
    DuplicateNode,
    DanglingEdge,
    NonFiniteCoordinate,
    JsonDeserialization,
    JsonSerialization,
    SinkWrite,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            DoesNotExist => "does_not_exist",
            DuplicateNode => "duplicate_node",
            DanglingEdge => "dangling_edge",
            NonFiniteCoordinate => "non_finite_coordinate",
            JsonDeserialization => "json_deserialization",
            JsonSerialization => "json_serialization",
            SinkWrite => "sink_write",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed construction input: the whole layout session is rejected.
    InvalidGraph,
    /// An operation referenced a node id the graph doesn't contain.
    UnknownNode,
    /// Graph or config data couldn't be decoded.
    Import,
    /// A position sink failed to accept a frame.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let code = if err.is_io() {
            ErrorCode::JsonSerialization
        } else {
            ErrorCode::JsonDeserialization
        };
        Error {
            kind: ErrorKind::Import,
            code,
            details: Some(err.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::InvalidGraph => "InvalidGraph",
            ErrorKind::UnknownNode => "UnknownNode",
            ErrorKind::Import => "ImportError",
            ErrorKind::Output => "OutputError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! graph_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::InvalidGraph,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::InvalidGraph, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! unknown_node_err {
    ($id:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::UnknownNode,
            ErrorCode::DoesNotExist,
            Some(format!("node {}", $id)),
        ))
    }};
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::InvalidGraph,
        ErrorCode::DanglingEdge,
        Some("edge 0 references node 9".to_owned()),
    );
    assert_eq!(
        "InvalidGraph{dangling_edge: edge 0 references node 9}",
        format!("{err}")
    );

    let err = Error::new(ErrorKind::UnknownNode, ErrorCode::DoesNotExist, None);
    assert_eq!("UnknownNode{does_not_exist}", format!("{err}"));
}

#[test]
fn test_json_error_is_import() {
    let parsed: result::Result<Vec<i64>, _> = serde_json::from_str("[1, 2");
    let err: Error = parsed.unwrap_err().into();
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::JsonDeserialization, err.code);
    assert!(err.get_details().is_some());
}
