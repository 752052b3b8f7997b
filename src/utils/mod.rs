// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and business logic.

pub mod hash;

/// Compute the SHA-256 digest of a byte buffer.
pub use hash::hash_bytes;
