//! List values and their tagged machine-word encoding.
//!
//! A [`Value`] is either a reference to a cons cell living in one of the two
//! semispaces, or an immediate small integer. Inside the heap every value is
//! stored as a single [`Word`] whose lowest bit is the tag:
//!
//! - Bit 0 = 1: small integer, payload in the remaining bits
//! - Bit 0 = 0: heap reference, word address in the remaining bits
//!
//! The tag trick never leaves this module; the rest of the runtime works with
//! the explicit enum.

use std::fmt;

use crate::GcError;

/// Number of low bits reserved for the tag.
pub const TAG_BITS: u32 = 1;

const INT_TAG: usize = 1;

/// Number of words in a cons cell (car + cdr).
pub const CELL_WORDS: usize = 2;

/// Largest integer representable as a [`Value::SmallInt`].
pub const SMALL_INT_MAX: isize = isize::MAX >> TAG_BITS;

/// Smallest integer representable as a [`Value::SmallInt`].
pub const SMALL_INT_MIN: isize = isize::MIN >> TAG_BITS;

/// Word offset into the heap.
///
/// Addresses of real cells are always cell aligned (a multiple of
/// [`CELL_WORDS`]). Addresses beyond the heap are legal values and act as
/// atoms, which is how [`Value::NIL`] is represented.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(usize);

impl Address {
    /// Largest address that still fits in a tagged word.
    pub const MAX: usize = usize::MAX >> TAG_BITS;

    /// Sentinel address used for the empty list. Never inside a semispace.
    pub const NIL: Address = Address(Self::MAX);

    /// Creates an address from a word offset.
    ///
    /// # Panics
    ///
    /// Panics if `word` does not fit in a tagged word.
    pub fn new(word: usize) -> Self {
        assert!(
            word <= Self::MAX,
            "address {} does not fit in a tagged word",
            word
        );
        Address(word)
    }

    /// Returns the word offset of this address.
    pub const fn word(self) -> usize {
        self.0
    }

    /// Returns the address `words` words further on.
    pub fn offset(self, words: usize) -> Self {
        Address::new(self.0 + words)
    }

    /// Returns the address `words` words back.
    pub fn back(self, words: usize) -> Self {
        Address(self.0 - words)
    }

    /// Returns whether this address is the start of a cell.
    pub const fn is_cell_aligned(self) -> bool {
        self.0 % CELL_WORDS == 0
    }

    /// Index of the cell starting at this address.
    pub const fn cell_index(self) -> usize {
        self.0 / CELL_WORDS
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Address::NIL {
            write!(f, "@nil")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A raw tagged machine word as stored in a heap slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word(usize);

impl Word {
    /// Wraps raw bits.
    pub const fn from_raw(bits: usize) -> Self {
        Word(bits)
    }

    /// Returns the raw bits.
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Returns whether the tag bit marks an immediate integer.
    pub const fn is_integer(self) -> bool {
        self.0 & INT_TAG == INT_TAG
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#x})", self.0)
    }
}

/// A value held in a cell slot, a root, or a mutator variable.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let n = Value::integer(42);
/// assert!(n.is_integer());
/// assert_eq!(n.decode().unwrap(), 42);
/// assert_eq!(Value::from_word(n.to_word()), n);
///
/// assert!(!Value::NIL.is_integer());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Reference to the cell starting at this address
    HeapRef(Address),
    /// Immediate integer, one bit narrower than `isize`
    SmallInt(isize),
}

impl Value {
    /// The empty list. A heap reference that points outside both semispaces.
    pub const NIL: Value = Value::HeapRef(Address::NIL);

    /// Encodes `v` as a small integer.
    ///
    /// # Panics
    ///
    /// Panics if `v` is outside `SMALL_INT_MIN..=SMALL_INT_MAX`. Use
    /// [`Value::try_integer`] when the range is not known in advance.
    pub fn integer(v: isize) -> Self {
        match Self::try_integer(v) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Encodes `v` as a small integer if the tagged round trip preserves it.
    pub fn try_integer(v: isize) -> Result<Self, GcError> {
        let value = Value::SmallInt(v);
        if Value::from_word(value.to_word()) == value {
            Ok(value)
        } else {
            Err(GcError::TypeContractViolation {
                expected: "integer within the small integer range",
                found: format!("{}", v),
            })
        }
    }

    /// Returns `self` if it survives the tagged encoding unchanged.
    ///
    /// `SmallInt` can be built directly with a payload that does not fit in
    /// the tagged word; storing such a value would lose its top bit.
    pub fn checked(self) -> Result<Self, GcError> {
        match self {
            Value::SmallInt(n) => Self::try_integer(n),
            Value::HeapRef(_) => Ok(self),
        }
    }

    /// Returns whether this value is an immediate integer.
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::SmallInt(_))
    }

    /// Returns whether this value is the empty list.
    pub fn is_nil(&self) -> bool {
        *self == Value::NIL
    }

    /// Returns the integer payload, if any.
    pub const fn as_integer(&self) -> Option<isize> {
        match self {
            Value::SmallInt(n) => Some(*n),
            Value::HeapRef(_) => None,
        }
    }

    /// Returns the referenced address, if any.
    pub const fn as_address(&self) -> Option<Address> {
        match self {
            Value::HeapRef(addr) => Some(*addr),
            Value::SmallInt(_) => None,
        }
    }

    /// Extracts the integer payload.
    ///
    /// Decoding a heap reference is a caller error and reported as
    /// [`GcError::TypeContractViolation`].
    pub fn decode(self) -> Result<isize, GcError> {
        self.as_integer()
            .ok_or_else(|| GcError::type_violation("integer", self))
    }

    /// Encodes this value into a tagged heap word.
    pub fn to_word(self) -> Word {
        match self {
            Value::HeapRef(addr) => Word(addr.word() << TAG_BITS),
            Value::SmallInt(n) => Word(((n << TAG_BITS) as usize) | INT_TAG),
        }
    }

    /// Decodes a tagged heap word.
    pub fn from_word(word: Word) -> Self {
        if word.is_integer() {
            Value::SmallInt((word.0 as isize) >> TAG_BITS)
        } else {
            Value::HeapRef(Address(word.0 >> TAG_BITS))
        }
    }
}

impl From<Address> for Value {
    fn from(addr: Address) -> Self {
        Value::HeapRef(addr)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::HeapRef(addr) => f.debug_tuple("HeapRef").field(addr).finish(),
            Value::SmallInt(n) => f.debug_tuple("SmallInt").field(n).finish(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::SmallInt(n) => write!(f, "{}", n),
            Value::HeapRef(addr) if *addr == Address::NIL => write!(f, "()"),
            Value::HeapRef(addr) => write!(f, "#<cell {}>", addr),
        }
    }
}
