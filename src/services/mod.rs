//! Background services used by the editor session.
//!
//! ARCHITECTURE
//! ============
//! Service modules own I/O concerns so the session can stay a thin
//! translation layer between editor actions and the store.

pub mod persistence;
