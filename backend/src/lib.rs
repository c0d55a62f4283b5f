//! Careline backend: patient health metrics, care-team assignments, and
//! patient/provider messaging behind one access policy.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use doc::ApiDoc;
pub use middleware::Trace;
