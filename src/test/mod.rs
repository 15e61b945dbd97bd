//! Flow graph shapes shared by the unit tests.
//!
//! Each factory returns the graph together with its blocks in creation order, so
//! tests can refer to `blocks[2]` instead of re-deriving node ids. Locals are
//! documented per shape; `V00` is a parameter unless stated otherwise.

mod factories;

pub(crate) use factories::*;
