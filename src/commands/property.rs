//! Property access commands
//!
//! The Si47xx exposes its tunable parameters as a flat 16-bit property space
//! rather than a register file. These two commands are the only way in and
//! out of it; the typed property ids and their documented ranges live in
//! [`crate::properties`].

use core::convert::Infallible;

use crate::{Command, FromByteArray, IntStatus, ToByteArray};

/// A property id/value pair as it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyValue {
    /// 16-bit property id
    pub property: u16,
    /// 16-bit raw value
    pub value: u16,
}

impl ToByteArray for PropertyValue {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let property = self.property.to_be_bytes();
        let value = self.value.to_be_bytes();
        Ok([0x00, property[0], property[1], value[0], value[1]])
    }
}

/// SetProperty command (0x12)
///
/// Writes one property. The write takes effect once CTS is raised; there is
/// no response payload beyond the status word.
///
/// # Important Notes
/// - Property writes are not validated by the chip; out-of-range values
///   silently misbehave, which is why the driver validates before sending
/// - Mode-specific properties written in the wrong function are ignored
#[derive(Debug, Clone)]
pub struct SetProperty {
    /// Property id/value pair to write
    pub value: PropertyValue,
}

impl Command for SetProperty {
    type IdType = u8;
    type CommandParameters = PropertyValue;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x12
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.value
    }
}

/// GetProperty arguments: the property id to read.
#[derive(Debug, Clone, Copy)]
pub struct PropertyQuery {
    /// 16-bit property id
    pub property: u16,
}

impl ToByteArray for PropertyQuery {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let property = self.property.to_be_bytes();
        Ok([0x00, property[0], property[1]])
    }
}

/// GetProperty response: status word plus the 16-bit value.
#[derive(Debug, Clone, Copy)]
pub struct GetPropertyResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// Raw property value
    pub value: u16,
}

impl FromByteArray for GetPropertyResponse {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            value: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// GetProperty command (0x13)
///
/// Reads one property back from the chip. The driver always reads through to
/// the chip rather than caching written values, since several properties are
/// also updated by the chip firmware itself (soft-mute attenuation, AGC).
#[derive(Debug, Clone)]
pub struct GetProperty {
    /// Query arguments
    pub query: PropertyQuery,
}

impl Command for GetProperty {
    type IdType = u8;
    type CommandParameters = PropertyQuery;
    type ResponseParameters = GetPropertyResponse;

    fn id() -> Self::IdType {
        0x13
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_property_packs_big_endian() {
        let value = PropertyValue {
            property: 0x4000,
            value: 0x003F,
        };
        assert_eq!(value.to_bytes().unwrap(), [0x00, 0x40, 0x00, 0x00, 0x3F]);
    }

    #[test]
    fn get_property_response_extracts_value() {
        let resp = GetPropertyResponse::from_bytes([0x80, 0x00, 0x12, 0x34]).unwrap();
        assert_eq!(resp.value, 0x1234);
        assert!(resp.status.contains(IntStatus::CTS));
    }
}
