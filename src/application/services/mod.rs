//! Use-case services. Import only from `crate::domain` and
//! `crate::application::ports`; all I/O goes through injected ports.

pub mod artifact;
pub mod liveness;
pub mod shutdown;
