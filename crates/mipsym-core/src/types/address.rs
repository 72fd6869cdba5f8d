//! Target address types.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed 32-bit target address
///
/// The executables this crate deals with target 32-bit MIPS, so every address
/// fits in a `u32`. A symbol without an address stores `Option<Address>::None`,
/// which keeps "absent" distinct from address zero.
///
/// ## Example
///
/// ```rust
/// use mipsym_core::types::Address;
///
/// let addr = Address::from(0x0010_0000);
/// let next_addr = addr + 0x100; // Add offset
/// assert_eq!(next_addr.value(), 0x0010_0100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u32);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u32` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u32) -> Self
    {
        Address(value)
    }

    /// Get the raw `u32` value of this address
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ## Example
    ///
    /// ```rust
    /// use mipsym_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u32::MAX), None); // Overflow
    /// ```
    pub fn checked_add(self, offset: u32) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: u32) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }
}

impl From<u32> for Address
{
    fn from(value: u32) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u32
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u32> for Address
{
    type Output = Address;

    fn add(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u32> for Address
{
    type Output = Address;

    fn sub(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}

/// Half-open address interval `[start, start + size)`
///
/// The end is computed in 64-bit arithmetic so a range that touches the top of
/// the address space doesn't wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressRange
{
    /// First address covered by the range.
    pub start: Address,
    /// Number of bytes covered.
    pub size: u32,
}

impl AddressRange
{
    /// Build a range from its start address and size in bytes.
    pub const fn new(start: Address, size: u32) -> Self
    {
        Self { start, size }
    }

    /// Exclusive end of the range.
    pub fn end(&self) -> u64
    {
        u64::from(self.start.value()) + u64::from(self.size)
    }

    /// Check whether `address` lies inside the range.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use mipsym_core::types::{Address, AddressRange};
    ///
    /// let range = AddressRange::new(Address::from(0x1000), 0x10);
    /// assert!(range.contains(Address::from(0x100f)));
    /// assert!(!range.contains(Address::from(0x1010)));
    /// ```
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && u64::from(address.value()) < self.end()
    }

    /// True if the range covers no addresses at all.
    pub fn is_empty(&self) -> bool
    {
        self.size == 0
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{}, 0x{:08x})", self.start, self.end())
    }
}
