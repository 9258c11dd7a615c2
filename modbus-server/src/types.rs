use crate::constants::limits;

/// Modbus unit identifier, just a type-safe wrapper around `u8`
///
/// Every unit id is routed to the same handler; the value is passed through so the
/// handler can implement sub-addressing if it wants to.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnitId {
    /// underlying raw value
    pub value: u8,
}

impl UnitId {
    /// Create a new unit id
    pub const fn new(value: u8) -> Self {
        Self { value }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04X}", self.value)
    }
}

/// Start and count of a block of consecutive points
///
/// Ranges handed to a request handler always satisfy `count >= 1` and
/// `start + count - 1 <= 0xFFFF`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address of the range
    pub start: u16,
    /// Count of elements in the range
    pub count: u16,
}

impl AddressRange {
    /// Create a range, returning `None` if it is empty or runs past address `0xFFFF`
    pub fn try_from(start: u16, count: u16) -> Option<Self> {
        if count == 0 || !Self::fits(start, count) {
            return None;
        }
        Some(Self { start, count })
    }

    // only called once the count has been checked against the function's limits
    pub(crate) fn fits(start: u16, count: u16) -> bool {
        (start as u32) + (count as u32) - 1 <= limits::MAX_ADDRESS
    }

    pub(crate) fn single(start: u16) -> Self {
        Self { start, count: 1 }
    }

    /// Converts to `std::ops::Range`, handy for slicing into a backing table
    pub fn to_std_range(self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + (self.count as usize)
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "start: {:#06X} qty: {}", self.start, self.count)
    }
}

/// Whether a coil or holding register request reads or writes the range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation<'a, T> {
    /// Return the current values of the range
    Read,
    /// Set the range to these values, ordered from `range.start` upwards
    Write(&'a [T]),
}

impl<'a, T> Operation<'a, T> {
    /// true for [`Operation::Write`]
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Write(_))
    }
}
