//! Typed IDs for token records

use kernel::id::Id;

#[derive(Clone, Copy)]
pub struct RefreshTokenMarker;
pub type RefreshTokenId = Id<RefreshTokenMarker>;

#[derive(Clone, Copy)]
pub struct EphemeralTokenMarker;
pub type EphemeralTokenId = Id<EphemeralTokenMarker>;
