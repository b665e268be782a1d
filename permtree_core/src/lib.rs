//! Permission tree model used by the dealing-desk role management screens.
//!
//! The central type is [`PermissionTree`]: an immutable, validated forest of
//! permission nodes. Selection sets ([`SelectionSet`]) are owned by the caller;
//! every operation on the tree takes a selection snapshot and returns a new one,
//! so keeping the previous snapshot around is all that undo requires.
//!
//! Built-in trees and fixture roles live in [`catalogue`].

pub mod catalogue;
pub mod id;
pub mod roles;
pub mod selection;
pub mod tree;

pub use id::RoleId;
pub use roles::*;
pub use selection::*;
pub use tree::*;
