//! Re-exports of synchronous `Mutex` and `RwLock` structures to simplify switching between
//! different implementations.

pub(crate) use parking_lot::Mutex;
pub(crate) use parking_lot::RwLock;
