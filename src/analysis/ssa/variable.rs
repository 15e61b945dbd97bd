//! Variables and SSA numbers.
//!
//! The SSA builder renames a fixed set of storage locations: the method's tracked
//! local slots, identified by dense [`LocalId`]s, plus one abstract [`Variable::Heap`]
//! standing in for all memory that is not a provably unaliased local. Each
//! definition of a variable receives an [`SsaNum`]; the pair of variable and number
//! (an [`SsaName`]) names exactly one definition.
//!
//! # Dense Slots
//!
//! Per-variable tables (rename stacks, number counters, definition sites) are plain
//! vectors addressed by [`Variable::slot`]: locals occupy slots `0..local_count`
//! and the heap takes the slot right after them.

use std::fmt;

use bitflags::bitflags;

/// A dense identifier of a tracked local slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(u32);

impl LocalId {
    /// Creates a local id from its slot number.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        LocalId(index)
    }

    /// Returns the slot number as `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:02}", self.0)
    }
}

/// A renameable storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// A tracked local slot (arguments included).
    Local(LocalId),
    /// The single abstract memory variable.
    Heap,
}

impl Variable {
    /// Shorthand for `Variable::Local(LocalId::new(index))`.
    #[must_use]
    pub const fn local(index: u32) -> Self {
        Variable::Local(LocalId::new(index))
    }

    /// Returns `true` for the heap variable.
    #[must_use]
    pub const fn is_heap(self) -> bool {
        matches!(self, Variable::Heap)
    }

    /// Returns the local id, or `None` for the heap.
    #[must_use]
    pub const fn as_local(self) -> Option<LocalId> {
        match self {
            Variable::Local(id) => Some(id),
            Variable::Heap => None,
        }
    }

    /// Returns the dense table slot of this variable.
    ///
    /// # Arguments
    ///
    /// * `local_count` - Number of tracked locals of the method
    #[must_use]
    pub const fn slot(self, local_count: usize) -> usize {
        match self {
            Variable::Local(id) => id.index(),
            Variable::Heap => local_count,
        }
    }

    /// Inverse of [`slot`](Self::slot).
    #[must_use]
    pub fn from_slot(slot: usize, local_count: usize) -> Self {
        if slot >= local_count {
            Variable::Heap
        } else {
            // Slots below `local_count` came from a `u32` local id
            Variable::Local(LocalId(slot as u32))
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Local(id) => write!(f, "{id}"),
            Variable::Heap => write!(f, "Heap"),
        }
    }
}

bitflags! {
    /// Properties of a local slot that decide how SSA treats it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LocalFlags: u8 {
        /// The local is an incoming argument and holds a value on entry.
        const PARAM = 0x01;
        /// The local is zero-initialised in the prolog.
        const MUST_INIT = 0x02;
        /// The local's address escapes; it can change behind the builder's back.
        const ADDRESS_EXPOSED = 0x04;
        /// The local is not tracked by liveness.
        const UNTRACKED = 0x08;
    }
}

/// Metadata of one local slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalVar {
    flags: LocalFlags,
    name: Option<String>,
}

impl LocalVar {
    /// Creates a plain local with the given flags.
    #[must_use]
    pub fn new(flags: LocalFlags) -> Self {
        LocalVar { flags, name: None }
    }

    /// Creates an incoming argument.
    #[must_use]
    pub fn param() -> Self {
        Self::new(LocalFlags::PARAM)
    }

    /// Creates an ordinary temporary with no value on entry.
    #[must_use]
    pub fn temp() -> Self {
        Self::new(LocalFlags::empty())
    }

    /// Attaches a debug name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the flags of this local.
    #[must_use]
    pub fn flags(&self) -> LocalFlags {
        self.flags
    }

    /// Returns the debug name, if one was attached.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` if the local takes part in SSA renaming.
    ///
    /// Address-exposed and untracked locals are left alone; their operations keep
    /// [`SsaNum::RESERVED`].
    #[must_use]
    pub fn in_ssa(&self) -> bool {
        !self
            .flags
            .intersects(LocalFlags::ADDRESS_EXPOSED | LocalFlags::UNTRACKED)
    }

    /// Returns `true` if the local holds a defined value when the method starts.
    #[must_use]
    pub fn initialized_on_entry(&self) -> bool {
        self.flags
            .intersects(LocalFlags::PARAM | LocalFlags::MUST_INIT)
    }
}

/// An SSA definition number.
///
/// Numbers are opaque per-variable counters: they are compared for equality and
/// used as table indices, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SsaNum(u32);

impl SsaNum {
    /// "No SSA number": the node is not renamed or has not been renamed yet.
    pub const RESERVED: SsaNum = SsaNum(0);

    /// The first number handed out for any variable.
    pub const FIRST: SsaNum = SsaNum(1);

    /// Creates a number from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        SsaNum(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns `true` for [`SsaNum::RESERVED`].
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SsaNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A variable together with one of its SSA numbers; names exactly one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SsaName {
    /// The renamed variable
    pub var: Variable,
    /// The definition number
    pub num: SsaNum,
}

impl SsaName {
    /// Creates a new name.
    #[must_use]
    pub const fn new(var: Variable, num: SsaNum) -> Self {
        SsaName { var, num }
    }
}

impl fmt::Display for SsaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.var, self.num)
    }
}
