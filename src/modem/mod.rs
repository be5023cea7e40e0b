// ABOUTME: Modem module: the link trait, the AT+CMGS transaction, options and the Modem front-end
// ABOUTME: Exports the send path components and their error types

//! Sending through a GSM modem in PDU mode
//!
//! * **`ModemLink`** - line-oriented link trait (native async fn in traits)
//! * **`SendTransaction`** - one AT+CMGS exchange as an explicit state machine
//! * **`Modem`** - splits a message and runs one transaction per segment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gsm_sms::connection::Connection;
//! use gsm_sms::datatypes::Address;
//! use gsm_sms::message::SmsMessage;
//! use gsm_sms::modem::{Modem, ModemOptions};
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = TcpStream::connect("127.0.0.1:7000").await?;
//! let options = ModemOptions::default().with_await_final_ok(true);
//! let mut modem = Modem::with_options(Connection::new(socket), options);
//!
//! let message = SmsMessage::ring_tone(Address::new("+46708251358")?, vec![0x02, 0x4A, 0x3A]);
//! let receipts = modem.send_message(&message).await?;
//! println!("sent {} segment(s)", receipts.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod options;
pub mod sender;
pub mod traits;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ModemError, ModemResult, ProtocolError};
pub use options::ModemOptions;
pub use sender::Modem;
pub use traits::ModemLink;
pub use transaction::{
    CMGS_PROMPT, DEFAULT_TERMINATOR, SendReceipt, SendTransaction, TransactionState,
    parse_cmgs_response,
};
