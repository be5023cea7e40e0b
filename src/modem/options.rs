// ABOUTME: Configuration for sending through a modem: SMSC override, validity and PDU terminator
// ABOUTME: Builder-style options with defaults matching a stock GSM modem in PDU mode

use crate::codec::{CodecError, decode_hex};
use crate::datatypes::{Address, default_smsc};
use crate::modem::transaction::DEFAULT_TERMINATOR;
use bytes::Bytes;

/// Options applied to every transaction a [`Modem`](crate::modem::Modem) runs
///
/// # Example
///
/// ```rust
/// use gsm_sms::datatypes::Address;
/// use gsm_sms::modem::ModemOptions;
///
/// // Defaults: modem's stored SMSC, PDU ended with Ctrl-Z
/// let options = ModemOptions::default();
///
/// // Explicit SMSC, and a modem that also wants a carriage return after Ctrl-Z
/// let options = ModemOptions::default()
///     .with_smsc_address(Address::new("+46708251358").unwrap())
///     .with_terminator_hex("1A0D")
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ModemOptions {
    /// SMSC to submit through (default: the one stored in the modem)
    pub smsc_address: Option<Address>,

    /// Bytes written after the hex-coded PDU (default: 0x1A)
    pub terminator: Bytes,

    /// Relative validity period applied when a message sets none
    pub validity: Option<u8>,

    /// Consume the final `OK` the modem sends after each `+CMGS` line
    pub await_final_ok: bool,
}

impl Default for ModemOptions {
    fn default() -> Self {
        Self {
            smsc_address: None,
            terminator: Bytes::from_static(&[DEFAULT_TERMINATOR]),
            validity: None,
            await_final_ok: false,
        }
    }
}

impl ModemOptions {
    pub fn with_smsc_address(mut self, smsc_address: Address) -> Self {
        self.smsc_address = Some(smsc_address);
        self
    }

    pub fn with_terminator(mut self, terminator: Bytes) -> Self {
        self.terminator = terminator;
        self
    }

    /// TP-VP in relative format, e.g. 0xA7 for 24 hours
    pub fn with_validity(mut self, validity: u8) -> Self {
        self.validity = Some(validity);
        self
    }

    pub fn with_await_final_ok(mut self, await_final_ok: bool) -> Self {
        self.await_final_ok = await_final_ok;
        self
    }

    /// Set the terminator from a hex string such as `"1A"` or `"1A0D"`
    pub fn with_terminator_hex(self, terminator: &str) -> Result<Self, CodecError> {
        Ok(self.with_terminator(decode_hex(terminator)?))
    }

    /// The encoded SMSC information field sent ahead of each TPDU
    pub fn smsc_field(&self) -> Bytes {
        self.smsc_address
            .as_ref()
            .map(Address::encode_smsc)
            .unwrap_or_else(default_smsc)
    }
}
