// ABOUTME: GSM 03.40 address fields with type-of-number and numbering-plan validation
// ABOUTME: Encodes SMSC and destination numbers as swapped-nibble semi-octets

use crate::codec::CodecError;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::TryFromPrimitive;
use std::fmt;

/// Type of number, bits 6..4 of the type-of-address octet
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TypeOfNumber {
    #[default]
    Unknown = 0b000,
    International = 0b001,
    National = 0b010,
    NetworkSpecific = 0b011,
    SubscriberNumber = 0b100,
    Alphanumeric = 0b101,
    Abbreviated = 0b110,
}

/// Numbering plan identification, bits 3..0 of the type-of-address octet
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum NumericPlanIndicator {
    Unknown = 0b0000,
    #[default]
    Isdn = 0b0001,
    Data = 0b0011,
    Telex = 0b0100,
    National = 0b1000,
    Private = 0b1001,
    Ermes = 0b1010,
}

/// A numeric GSM address (SMSC or destination)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    digits: String,
    ton: TypeOfNumber,
    npi: NumericPlanIndicator,
}

impl Address {
    /// Create an address from a dialable number.
    ///
    /// A leading `+` selects the international type of number. The remaining
    /// characters must be digits or `*`/`#`.
    pub fn new(number: &str) -> Result<Self, CodecError> {
        match number.strip_prefix('+') {
            Some(rest) => Self::with_type(rest, TypeOfNumber::International, NumericPlanIndicator::Isdn),
            None => Self::with_type(number, TypeOfNumber::Unknown, NumericPlanIndicator::Isdn),
        }
    }

    /// Create an address with an explicit type of number and numbering plan
    pub fn with_type(
        digits: &str,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
    ) -> Result<Self, CodecError> {
        if ton == TypeOfNumber::Alphanumeric {
            return Err(CodecError::FieldValidation {
                field: "address",
                reason: "alphanumeric addresses are not supported for submission".to_string(),
            });
        }
        if digits.is_empty() {
            return Err(CodecError::FieldValidation {
                field: "address",
                reason: "address must contain at least one digit".to_string(),
            });
        }
        if digits.len() > 20 {
            return Err(CodecError::FieldValidation {
                field: "address",
                reason: format!("{} digits exceeds the 20 digit maximum", digits.len()),
            });
        }
        if let Some(c) = digits.chars().find(|c| !matches!(c, '0'..='9' | '*' | '#')) {
            return Err(CodecError::FieldValidation {
                field: "address",
                reason: format!("invalid character {c:?}"),
            });
        }

        Ok(Self {
            digits: digits.to_string(),
            ton,
            npi,
        })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn type_of_number(&self) -> TypeOfNumber {
        self.ton
    }

    /// Type-of-address octet: `1 TTT NNNN`
    pub fn type_of_address(&self) -> u8 {
        0x80 | ((self.ton as u8) << 4) | (self.npi as u8)
    }

    /// SMSC information field; the length counts octets including the
    /// type-of-address byte.
    pub fn encode_smsc(&self) -> Bytes {
        let semi_octets = self.semi_octets();
        let mut buf = BytesMut::with_capacity(2 + semi_octets.len());
        buf.put_u8((semi_octets.len() + 1) as u8);
        buf.put_u8(self.type_of_address());
        buf.put_slice(&semi_octets);
        buf.freeze()
    }

    /// TP-Destination-Address; the length counts digits.
    pub fn encode_destination(&self, buf: &mut BytesMut) {
        buf.put_u8(self.digits.len() as u8);
        buf.put_u8(self.type_of_address());
        buf.put_slice(&self.semi_octets());
    }

    fn semi_octets(&self) -> Vec<u8> {
        let nibbles: Vec<u8> = self.digits.bytes().map(digit_nibble).collect();
        nibbles
            .chunks(2)
            .map(|pair| {
                let low = pair[0];
                let high = pair.get(1).copied().unwrap_or(0x0F);
                (high << 4) | low
            })
            .collect()
    }
}

fn digit_nibble(c: u8) -> u8 {
    match c {
        b'*' => 0x0A,
        b'#' => 0x0B,
        digit => digit - b'0',
    }
}

/// SMSC field meaning "use the SMSC stored in the modem"
pub fn default_smsc() -> Bytes {
    Bytes::from_static(&[0x00])
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ton == TypeOfNumber::International {
            write!(f, "+")?;
        }
        write!(f, "{}", self.digits)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self}, {:?}/{:?})", self.ton, self.npi)
    }
}

impl std::str::FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international_destination() {
        let address = Address::new("+46708251358").unwrap();
        assert_eq!(address.type_of_number(), TypeOfNumber::International);
        assert_eq!(address.type_of_address(), 0x91);

        let mut buf = BytesMut::new();
        address.encode_destination(&mut buf);
        assert_eq!(
            buf.as_ref(),
            &[0x0B, 0x91, 0x64, 0x07, 0x28, 0x15, 0x53, 0xF8]
        );
    }

    #[test]
    fn test_smsc_length_counts_octets() {
        let smsc = Address::new("+46708251358").unwrap();
        let encoded = smsc.encode_smsc();
        // 6 semi-octet bytes + type-of-address
        assert_eq!(encoded[0], 7);
        assert_eq!(encoded.len(), 8);
    }

    #[test]
    fn test_unknown_type_even_digits() {
        let address = Address::new("1234").unwrap();
        assert_eq!(address.type_of_address(), 0x81);
        let mut buf = BytesMut::new();
        address.encode_destination(&mut buf);
        assert_eq!(buf.as_ref(), &[0x04, 0x81, 0x21, 0x43]);
    }

    #[test]
    fn test_star_and_hash_digits() {
        let address = Address::new("*100#").unwrap();
        let mut buf = BytesMut::new();
        address.encode_destination(&mut buf);
        assert_eq!(buf.as_ref(), &[0x05, 0x81, 0x1A, 0x00, 0xFB]);
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(Address::new("").is_err());
        assert!(Address::new("+").is_err());
        assert!(Address::new("12a4").is_err());
        assert!(Address::new(&"1".repeat(21)).is_err());
        assert!(
            Address::with_type("123", TypeOfNumber::Alphanumeric, NumericPlanIndicator::Unknown)
                .is_err()
        );
    }

    #[test]
    fn test_display_and_parse() {
        let address: Address = "+15551234".parse().unwrap();
        assert_eq!(address.to_string(), "+15551234");
        assert_eq!(address.digits(), "15551234");
    }

    #[test]
    fn test_equal_addresses_hash_alike() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        assert!(seen.insert(Address::new("+4670").unwrap()));
        assert!(!seen.insert("+4670".parse::<Address>().unwrap()));
        assert!(seen.insert(Address::new("4670").unwrap()));
    }

    #[test]
    fn test_default_smsc() {
        assert_eq!(default_smsc().as_ref(), &[0x00]);
    }
}
