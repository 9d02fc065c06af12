//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random token material, SHA-256 digests)
//! - Password hashing (bcrypt, NIST SP 800-63B compliant validation)
//! - Duration-string parsing for token lifetimes

pub mod crypto;
pub mod duration;
pub mod password;
