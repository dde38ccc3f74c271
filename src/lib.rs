//! Bookshelf application library: the domain modules mounted by the binary.

pub mod modules;
