// ABOUTME: AT+CMGS send transaction implemented as an explicit protocol state machine
// ABOUTME: Issues the command, waits for the prompt, writes the hex PDU and classifies the result line

use crate::codec::{CodecError, decode_hex, encode_hex};
use crate::datatypes::default_smsc;
use crate::modem::error::{ModemError, ModemResult, ProtocolError};
use crate::modem::traits::ModemLink;
use bytes::Bytes;
use tracing::{debug, warn};

/// Continuation prompt sent by the modem after `AT+CMGS=<n>`
pub const CMGS_PROMPT: &str = "> ";

/// Ctrl-Z, ends the PDU and triggers the submission
pub const DEFAULT_TERMINATOR: u8 = 0x1A;

const CMGS_PREFIX: &str = "+CMGS";
const CMS_ERROR_PREFIX: &str = "+CMS ERROR:";

/// States of a single AT+CMGS exchange
///
/// ```text
/// Idle → AwaitingPrompt → SendingPdu → AwaitingResponse → Succeeded
///             │                               │
///             └──────────→ Failed ←───────────┘
/// ```
///
/// A transport error in any non-terminal state also ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    AwaitingPrompt,
    SendingPdu,
    AwaitingResponse,
    Succeeded,
    Failed,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Succeeded | TransactionState::Failed)
    }
}

/// Successful outcome of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendReceipt {
    /// TP-MR assigned by the modem, when the `+CMGS` line carried one
    pub message_reference: Option<u8>,
}

/// One PDU-mode send message request
///
/// A transaction runs once. After it reaches `Succeeded` or `Failed` it
/// cannot be reused; retrying means building a new transaction.
///
/// # Example
///
/// ```rust,no_run
/// use bytes::Bytes;
/// use gsm_sms::modem::{ModemLink, SendTransaction};
///
/// # async fn example(link: &mut impl ModemLink) -> Result<(), Box<dyn std::error::Error>> {
/// let sms_pdu = Bytes::from_static(&[0x01, 0x00, 0x04, 0x81, 0x21, 0x43, 0x00, 0x04, 0x00]);
/// let mut transaction = SendTransaction::with_default_smsc(sms_pdu);
/// let receipt = transaction.send(link).await?;
/// println!("message reference: {:?}", receipt.message_reference);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SendTransaction {
    smsc_pdu: Bytes,
    sms_pdu: Bytes,
    terminator: Bytes,
    state: TransactionState,
}

impl SendTransaction {
    /// Create a transaction for an explicit SMSC field and SMS-SUBMIT TPDU
    pub fn new(smsc_pdu: Bytes, sms_pdu: Bytes) -> Self {
        Self {
            smsc_pdu,
            sms_pdu,
            terminator: Bytes::from_static(&[DEFAULT_TERMINATOR]),
            state: TransactionState::Idle,
        }
    }

    /// Create a transaction that uses the SMSC stored in the modem
    pub fn with_default_smsc(sms_pdu: Bytes) -> Self {
        Self::new(default_smsc(), sms_pdu)
    }

    /// Replace the bytes written after the hex PDU
    pub fn with_terminator(mut self, terminator: Bytes) -> Self {
        self.terminator = terminator;
        self
    }

    /// Replace the terminator from a hex string, e.g. `"1A0D"` to follow
    /// Ctrl-Z with a carriage return
    pub fn with_terminator_hex(self, terminator: &str) -> Result<Self, CodecError> {
        Ok(self.with_terminator(decode_hex(terminator)?))
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// The command line written in `Idle`.
    ///
    /// The length counts TPDU octets only; the SMSC field is excluded.
    pub fn command(&self) -> String {
        format!("AT+CMGS={}\r", self.sms_pdu.len())
    }

    /// Hex-coded `smsc || tpdu` followed by the terminator
    pub fn encoded_pdu(&self) -> Vec<u8> {
        let mut data = encode_hex(&self.smsc_pdu).into_bytes();
        data.extend_from_slice(encode_hex(&self.sms_pdu).as_bytes());
        data.extend_from_slice(&self.terminator);
        data
    }

    /// Run the exchange on `link` until it succeeds or fails.
    ///
    /// Protocol failures are returned as [`ModemError::Protocol`] and
    /// transport failures as [`ModemError::Transport`]; both leave the
    /// transaction in `Failed`.
    pub async fn send<L: ModemLink>(&mut self, link: &mut L) -> ModemResult<SendReceipt> {
        if self.state != TransactionState::Idle {
            return Err(ModemError::InvalidState(format!(
                "transaction already ran ({:?})",
                self.state
            )));
        }

        let result = self.run(link).await;
        match &result {
            Ok(receipt) => {
                debug!("AT+CMGS succeeded, reference {:?}", receipt.message_reference);
                self.state = TransactionState::Succeeded;
            }
            Err(e) => {
                warn!("AT+CMGS failed in {:?}: {}", self.state, e);
                self.state = TransactionState::Failed;
            }
        }
        result
    }

    async fn run<L: ModemLink>(&mut self, link: &mut L) -> ModemResult<SendReceipt> {
        let command = self.command();
        debug!("Sending {}", command.trim_end());
        link.write(command.as_bytes()).await?;
        self.state = TransactionState::AwaitingPrompt;

        // The prompt is "> " without crlf
        let response = link.read_prompt(CMGS_PROMPT).await?;
        if response != CMGS_PROMPT {
            let text = strip_line_end(&response).to_string();
            return Err(ProtocolError::UnexpectedResponse(text).into());
        }
        self.state = TransactionState::SendingPdu;

        debug!("Sending hex-coded PDU ({} octets)", self.smsc_pdu.len() + self.sms_pdu.len());
        link.write(&self.encoded_pdu()).await?;
        self.state = TransactionState::AwaitingResponse;

        let response = link.read_line().await?;
        debug!("AT+CMGS response: {:?}", response);
        Ok(parse_cmgs_response(strip_line_end(&response))?)
    }
}

/// Classify the final AT+CMGS result line.
///
/// Success is decided by the `+CMGS` prefix alone; the message reference is
/// parsed when present and ignored when malformed.
pub fn parse_cmgs_response(line: &str) -> Result<SendReceipt, ProtocolError> {
    if let Some(rest) = line.strip_prefix(CMGS_PREFIX) {
        let message_reference = rest
            .trim_start_matches(':')
            .split(',')
            .next()
            .and_then(|mr| mr.trim().parse().ok());
        Ok(SendReceipt { message_reference })
    } else if line.starts_with(CMS_ERROR_PREFIX) {
        Err(ProtocolError::DeviceReportedError(line.to_string()))
    } else {
        Err(ProtocolError::UnexpectedResponse(line.to_string()))
    }
}

fn strip_line_end(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}
