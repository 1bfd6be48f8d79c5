// Security module for filesystem access policies
//
// This module provides the pure policy checks that gate every filesystem
// operation exposed to clients: a directory allow-list, an extension
// allow-list and a byte-size ceiling.

pub mod policy;

pub use policy::{
    PathCheckResult, check_path, extension_of, is_allowed, is_allowed_extension, is_within_limit,
    normalize_extension, normalize_path,
};
