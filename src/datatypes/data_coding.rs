// ABOUTME: Strongly-typed GSM 03.38 data coding scheme with alphabet and capacity rules
// ABOUTME: Translates user data octet budgets into per-alphabet character capacity

use std::fmt;

/// Maximum number of user data octets in a single SMS-SUBMIT TPDU
pub const MAX_USER_DATA_OCTETS: usize = 140;

/// Strongly-typed data coding scheme (TP-DCS)
///
/// Replaces raw u8 values with the coding groups this crate knows how to
/// segment. Other values survive as `Custom`; their alphabet is read from
/// the coding group bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataCoding {
    /// GSM 7-bit default alphabet
    #[default]
    Gsm7Bit,
    /// 8-bit binary data
    EightBit,
    /// UCS-2 (ISO/IEC-10646) Unicode encoding
    Ucs2,
    /// GSM 7-bit default alphabet with message class
    Gsm7BitWithClass(MessageClass),
    /// 8-bit data with message class
    EightBitWithClass(MessageClass),
    /// UCS-2 with message class
    Ucs2WithClass(MessageClass),
    /// Custom/reserved data coding value
    Custom(u8),
}

/// Character width family selected by a data coding scheme
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Alphabet {
    /// 7-bit septets, packed 8 characters into 7 octets
    Gsm7,
    /// One octet per unit
    Octet,
    /// Two octets per character
    Ucs2,
}

impl DataCoding {
    /// Creates a DataCoding from a raw TP-DCS byte
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x00 => DataCoding::Gsm7Bit,
            0x04 => DataCoding::EightBit,
            0x08 => DataCoding::Ucs2,
            // General data coding with message class bit set
            0x18 => DataCoding::Ucs2WithClass(MessageClass::Flash),
            0x19 => DataCoding::Ucs2WithClass(MessageClass::MobileEquipment),
            0x1A => DataCoding::Ucs2WithClass(MessageClass::SimSpecific),
            0x1B => DataCoding::Ucs2WithClass(MessageClass::TerminalEquipment),
            // Data coding / message class group (0xF0-0xF7)
            0xF0 => DataCoding::Gsm7BitWithClass(MessageClass::Flash),
            0xF1 => DataCoding::Gsm7BitWithClass(MessageClass::MobileEquipment),
            0xF2 => DataCoding::Gsm7BitWithClass(MessageClass::SimSpecific),
            0xF3 => DataCoding::Gsm7BitWithClass(MessageClass::TerminalEquipment),
            0xF4 => DataCoding::EightBitWithClass(MessageClass::Flash),
            0xF5 => DataCoding::EightBitWithClass(MessageClass::MobileEquipment),
            0xF6 => DataCoding::EightBitWithClass(MessageClass::SimSpecific),
            0xF7 => DataCoding::EightBitWithClass(MessageClass::TerminalEquipment),
            _ => DataCoding::Custom(value),
        }
    }

    /// Returns the raw u8 value for the TP-DCS field
    pub fn to_byte(&self) -> u8 {
        match self {
            DataCoding::Gsm7Bit => 0x00,
            DataCoding::EightBit => 0x04,
            DataCoding::Ucs2 => 0x08,
            DataCoding::Ucs2WithClass(class) => 0x18 | class.bits(),
            DataCoding::Gsm7BitWithClass(class) => 0xF0 | class.bits(),
            DataCoding::EightBitWithClass(class) => 0xF4 | class.bits(),
            DataCoding::Custom(value) => *value,
        }
    }

    /// Returns the alphabet family used to size the payload
    pub fn alphabet(&self) -> Alphabet {
        match self {
            DataCoding::Gsm7Bit | DataCoding::Gsm7BitWithClass(_) => Alphabet::Gsm7,
            DataCoding::Ucs2 | DataCoding::Ucs2WithClass(_) => Alphabet::Ucs2,
            DataCoding::EightBit | DataCoding::EightBitWithClass(_) => Alphabet::Octet,
            DataCoding::Custom(value) => custom_alphabet(*value),
        }
    }

    /// Returns true if this encoding packs septets
    pub fn is_7bit(&self) -> bool {
        self.alphabet() == Alphabet::Gsm7
    }

    /// Returns the message class if this coding scheme includes one
    pub fn message_class(&self) -> Option<MessageClass> {
        match self {
            DataCoding::Gsm7BitWithClass(class)
            | DataCoding::EightBitWithClass(class)
            | DataCoding::Ucs2WithClass(class) => Some(*class),
            // General data coding groups carry the class in bits 1..0 when bit 4 is set
            DataCoding::Custom(value) if value & 0x80 == 0 && value & 0x10 != 0 => {
                Some(MessageClass::from_bits(*value))
            }
            _ => None,
        }
    }

    /// Returns the character set name for this encoding
    pub fn charset_name(&self) -> &'static str {
        match self.alphabet() {
            Alphabet::Gsm7 => "GSM 7-bit Default",
            Alphabet::Ucs2 => "UCS-2",
            Alphabet::Octet => match self {
                DataCoding::Custom(_) => "Custom/Reserved",
                _ => "8-bit Data",
            },
        }
    }

    /// Payload units that fit in one TPDU of `max_octets` user data octets
    /// after `udh_octets` of header.
    ///
    /// Units are septets for the 7-bit alphabet and octets otherwise. UCS-2
    /// capacity is rounded down to whole characters.
    pub fn capacity(&self, max_octets: usize, udh_octets: usize) -> usize {
        let available = max_octets.saturating_sub(udh_octets);
        match self.alphabet() {
            Alphabet::Octet => available,
            Alphabet::Ucs2 => available & !1,
            Alphabet::Gsm7 => (available * 8) / 7,
        }
    }
}

/// Message class for SMS delivery
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageClass {
    /// Class 0, displayed immediately and not stored
    Flash,
    /// Class 1, mobile equipment specific
    MobileEquipment,
    /// Class 2, stored on the SIM
    SimSpecific,
    /// Class 3, terminal equipment specific
    TerminalEquipment,
}

/// Alphabet of a raw TP-DCS value outside the named variants.
///
/// General data coding groups (00xx xxxx, 01xx xxxx) select the alphabet in
/// bits 3..2; compressed text (bit 5) is sized as octets. 0xC0-0xDF is
/// message waiting with the default alphabet, 0xE0-0xEF with UCS-2, and
/// 0xF0-0xFF selects 7-bit or 8-bit in bit 2.
fn custom_alphabet(value: u8) -> Alphabet {
    match value {
        0x00..=0x7F if value & 0x20 == 0 => match (value >> 2) & 0x03 {
            0b00 => Alphabet::Gsm7,
            0b10 => Alphabet::Ucs2,
            _ => Alphabet::Octet,
        },
        0xC0..=0xDF => Alphabet::Gsm7,
        0xE0..=0xEF => Alphabet::Ucs2,
        0xF0..=0xFF if value & 0x04 == 0 => Alphabet::Gsm7,
        _ => Alphabet::Octet,
    }
}

impl MessageClass {
    fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => MessageClass::Flash,
            1 => MessageClass::MobileEquipment,
            2 => MessageClass::SimSpecific,
            _ => MessageClass::TerminalEquipment,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            MessageClass::Flash => 0,
            MessageClass::MobileEquipment => 1,
            MessageClass::SimSpecific => 2,
            MessageClass::TerminalEquipment => 3,
        }
    }

    /// Returns a human-readable description of the message class
    pub fn description(&self) -> &'static str {
        match self {
            MessageClass::Flash => "Flash SMS (immediate display)",
            MessageClass::MobileEquipment => "Mobile Equipment specific",
            MessageClass::SimSpecific => "SIM card storage",
            MessageClass::TerminalEquipment => "Terminal Equipment specific",
        }
    }
}

impl fmt::Display for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.charset_name())?;
        if let Some(class) = self.message_class() {
            write!(f, " ({})", class.description())?;
        }
        Ok(())
    }
}

impl fmt::Debug for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataCoding({} 0x{:02X})", self.charset_name(), self.to_byte())
    }
}

impl From<u8> for DataCoding {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl From<DataCoding> for u8 {
    fn from(data_coding: DataCoding) -> Self {
        data_coding.to_byte()
    }
}
