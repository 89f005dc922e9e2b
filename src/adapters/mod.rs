// Adapters layer: concrete implementations for external systems (subprocesses, HTTP).

pub mod http;
pub mod shell;

pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use shell::ShellRunner;
