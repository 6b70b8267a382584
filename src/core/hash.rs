//! Model Name Hashing
//!
//! The engine identifies models by the Jenkins one-at-a-time hash of their
//! lowercased name. Tables keyed by model (trunk types, seat-bone overrides)
//! are built from names with this function.

/// Engine model hash, as returned by entity model queries.
pub type ModelHash = u32;

/// Jenkins one-at-a-time hash of the lowercased name.
pub const fn joaat(name: &str) -> ModelHash {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0;
    let mut i = 0;

    while i < bytes.len() {
        hash = hash.wrapping_add(bytes[i].to_ascii_lowercase() as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
        i += 1;
    }

    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}
