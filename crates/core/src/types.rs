//! Shared type aliases.

/// Globally unique annotation entry index within one store document.
///
/// This is the store's primary key, not the position of an image in any
/// workset.
pub type EntryIndex = i64;

/// Opaque per-session identity token. Issued by the API layer, used only
/// as a lookup key; never persisted to durable storage.
pub type SessionId = String;
