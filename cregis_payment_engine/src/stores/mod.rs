//! Concrete order store implementations.
//!
//! In production the order store is the host commerce platform itself, reached through whatever bridge the
//! deployment uses. The in-memory store here backs the test suites and the standalone development server.

mod memory;

pub use memory::MemoryOrderStore;
