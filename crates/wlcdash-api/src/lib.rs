// wlcdash-api: Async client for the JSON endpoints behind a WLC web dashboard

pub mod endpoints;
pub mod error;
pub mod kv;
pub mod models;
pub mod query;
pub mod session;
pub mod transport;
pub mod validate;

pub use error::{Error, ErrorKind};
pub use kv::{Field, FieldMap, Fields, KvValue};
pub use query::{GridQuery, SortDir};
pub use session::{Credentials, Request, Response, Session, SessionState};
pub use transport::{TlsMode, TransportConfig};
