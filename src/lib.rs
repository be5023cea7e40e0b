// ABOUTME: GSM SMS library root: PDU-mode message building and sending through an AT modem
// ABOUTME: Re-exports the splitter, message flavors, codec helpers and the modem send path

//! Build GSM 03.40 SMS-SUBMIT PDUs and send them through a modem with
//! `AT+CMGS` in PDU mode.
//!
//! The send path has three layers:
//!
//! 1. [`PduSplitter`] cuts a payload into segments that fit 140 octets,
//!    adding application port and concatenation headers as needed.
//! 2. [`SmsSubmit`] wraps each segment in an SMS-SUBMIT TPDU.
//! 3. [`SendTransaction`] runs one `AT+CMGS` exchange over a [`ModemLink`].
//!
//! [`Modem`] ties them together for a whole [`SmsMessage`].
//!
//! # Examples
//!
//! ```rust
//! use gsm_sms::{DataCoding, PduSplitter, UdhElement};
//!
//! let splitter = PduSplitter::new();
//! let port = UdhElement::application_port_16bit(0x1581, 0);
//! let pdus = splitter.split(DataCoding::EightBit, &[port], &[0x4A; 300]).unwrap();
//!
//! assert_eq!(pdus.len(), 3);
//! assert!(pdus.iter().all(|pdu| pdu.has_udh()));
//! ```

mod macros;

pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod message;
pub mod modem;
pub mod splitter;
pub mod submit;


pub use codec::{CodecError, Encodable};
pub use connection::Connection;
pub use datatypes::{Address, ConcatInfo, DataCoding, Pdu, UdhElement};
pub use message::{MessageFlavor, SmsMessage};
pub use modem::{
    Modem, ModemError, ModemLink, ModemOptions, ModemResult, ProtocolError, SendReceipt,
    SendTransaction, TransactionState,
};
pub use splitter::{EncodingError, PduSplitter, ReferenceCounter};
pub use submit::SmsSubmit;
