// ABOUTME: Modem front-end that splits messages and sends each segment with a fresh transaction
// ABOUTME: Owns one link and one reference counter so concatenation references are scoped per link

use crate::datatypes::Pdu;
use crate::message::SmsMessage;
use crate::modem::error::{ModemError, ModemResult, ProtocolError};
use crate::modem::options::ModemOptions;
use crate::modem::traits::ModemLink;
use crate::modem::transaction::{SendReceipt, SendTransaction};
use crate::splitter::PduSplitter;
use crate::submit::SmsSubmit;
use bytes::Bytes;
use tracing::{debug, info, warn};

const FINAL_OK: &str = "OK";

/// A modem reachable over one link
///
/// Sends are strictly sequential: every method takes `&mut self`, so at
/// most one AT+CMGS exchange is in flight on the link.
pub struct Modem<L: ModemLink> {
    /// The link to the modem
    link: L,
    /// Splitter holding this link's concatenation reference counter
    splitter: PduSplitter,
    options: ModemOptions,
}

impl<L: ModemLink> Modem<L> {
    pub fn new(link: L) -> Self {
        Self::with_options(link, ModemOptions::default())
    }

    pub fn with_options(link: L, options: ModemOptions) -> Self {
        let splitter = PduSplitter::new().with_smsc_address(options.smsc_field());
        Self {
            link,
            splitter,
            options,
        }
    }

    pub fn options(&self) -> &ModemOptions {
        &self.options
    }

    pub fn splitter(&self) -> &PduSplitter {
        &self.splitter
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Give the link back, e.g. to discard it after a failed exchange
    pub fn into_inner(self) -> L {
        self.link
    }

    /// Split `message` and encode one SMS-SUBMIT TPDU per segment
    pub fn prepare(&self, message: &SmsMessage) -> ModemResult<Vec<(Pdu, Bytes)>> {
        let pdus = message.flavor.split(&self.splitter, &message.payload)?;
        let submit = SmsSubmit::new(message.destination.clone())
            .with_status_report(message.status_report)
            .with_validity(message.validity.or(self.options.validity));

        pdus.into_iter()
            .map(|pdu| {
                let tpdu = submit.encode(&pdu)?;
                Ok::<_, ModemError>((pdu, tpdu))
            })
            .collect()
    }

    /// Send every segment of `message` in order.
    ///
    /// Stops at the first segment that fails and returns its error; the
    /// remaining segments are not sent.
    pub async fn send_message(&mut self, message: &SmsMessage) -> ModemResult<Vec<SendReceipt>> {
        let segments = self.prepare(message)?;
        let total = segments.len();
        info!(
            "Sending {} segment(s) to {} ({})",
            total, message.destination, message.flavor.data_coding
        );

        let mut receipts = Vec::with_capacity(total);
        for (index, (pdu, tpdu)) in segments.into_iter().enumerate() {
            debug!("Segment {}/{}: {} octet TPDU", index + 1, total, tpdu.len());
            match self.send_pdu(pdu.smsc_address, tpdu).await {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => {
                    warn!("Segment {}/{} to {} failed: {}", index + 1, total, message.destination, e);
                    return Err(e);
                }
            }
        }

        Ok(receipts)
    }

    /// Send one already encoded SMS-SUBMIT TPDU
    pub async fn send_pdu(&mut self, smsc_pdu: Bytes, sms_pdu: Bytes) -> ModemResult<SendReceipt> {
        let mut transaction =
            SendTransaction::new(smsc_pdu, sms_pdu).with_terminator(self.options.terminator.clone());
        let receipt = transaction.send(&mut self.link).await?;

        if self.options.await_final_ok {
            let line = self.link.read_line().await?;
            if line != FINAL_OK {
                return Err(ProtocolError::UnexpectedResponse(line).into());
            }
        }

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Address;
    use crate::modem::testing::ScriptedLink;

    fn ring_tone(len: usize) -> SmsMessage {
        SmsMessage::ring_tone(Address::new("+46708251358").unwrap(), vec![0x4A; len])
    }

    #[tokio::test]
    async fn test_single_segment_message() {
        let link = ScriptedLink::new(["> ", "+CMGS: 3"]);
        let mut modem = Modem::new(link);

        let receipts = modem.send_message(&ring_tone(10)).await.unwrap();

        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].message_reference, Some(3));
        let writes = modem.into_inner().writes().to_vec();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].starts_with(b"AT+CMGS="));
        // default SMSC, then SMS-SUBMIT with UDHI
        assert!(writes[1].starts_with(b"0041"));
        assert_eq!(writes[1].last(), Some(&0x1A));
    }

    #[tokio::test]
    async fn test_multi_segment_message_sends_in_order() {
        let link = ScriptedLink::new(["> ", "+CMGS: 1", "> ", "+CMGS: 2", "> ", "+CMGS: 3"]);
        let mut modem = Modem::new(link);

        let receipts = modem.send_message(&ring_tone(300)).await.unwrap();

        let references: Vec<_> = receipts.iter().map(|r| r.message_reference).collect();
        assert_eq!(references, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(modem.into_inner().writes().len(), 6);
    }

    #[tokio::test]
    async fn test_stops_at_first_failed_segment() {
        let link = ScriptedLink::new(["> ", "+CMGS: 1", "> ", "+CMS ERROR: 304", "> ", "+CMGS: 3"]);
        let mut modem = Modem::new(link);

        let result = modem.send_message(&ring_tone(300)).await;

        assert!(matches!(
            result,
            Err(ModemError::Protocol(ProtocolError::DeviceReportedError(_)))
        ));
        assert_eq!(modem.into_inner().writes().len(), 4);
    }

    #[tokio::test]
    async fn test_oversized_message_sends_nothing() {
        let link = ScriptedLink::new(["> ", "+CMGS: 1"]);
        let mut modem = Modem::new(link);

        let result = modem.send_message(&ring_tone(128 * 255 + 1)).await;

        assert!(matches!(result, Err(ModemError::Encoding(_))));
        assert!(modem.into_inner().writes().is_empty());
    }

    #[tokio::test]
    async fn test_options_apply_to_every_segment() {
        let options = ModemOptions::default()
            .with_smsc_address(Address::new("+4670").unwrap())
            .with_terminator_hex("1A0D")
            .unwrap();
        let link = ScriptedLink::new(["> ", "+CMGS: 1", "> ", "+CMGS: 2"]);
        let mut modem = Modem::with_options(link, options);

        modem.send_message(&ring_tone(200)).await.unwrap();

        let writes = modem.into_inner().writes().to_vec();
        for pdu in [&writes[1], &writes[3]] {
            assert!(pdu.starts_with(b"03916407"));
            assert!(pdu.ends_with(&[0x1A, 0x0D]));
        }
    }

    #[tokio::test]
    async fn test_final_ok_is_consumed() {
        let options = ModemOptions::default().with_await_final_ok(true);
        let link = ScriptedLink::new(["> ", "+CMGS: 1", "OK", "> ", "+CMGS: 2", "OK"]);
        let mut modem = Modem::with_options(link, options);

        let receipts = modem.send_message(&ring_tone(200)).await.unwrap();

        assert_eq!(receipts.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_final_ok() {
        let options = ModemOptions::default().with_await_final_ok(true);
        let link = ScriptedLink::new(["> ", "+CMGS: 1", "ERROR"]);
        let mut modem = Modem::with_options(link, options);

        let result = modem.send_message(&ring_tone(10)).await;

        assert!(matches!(
            result,
            Err(ModemError::Protocol(ProtocolError::UnexpectedResponse(ref line))) if line == "ERROR"
        ));
    }

    #[test]
    fn test_default_validity_from_options() {
        let modem = Modem::with_options(
            ScriptedLink::default(),
            ModemOptions::default().with_validity(0xA7),
        );
        let (_, tpdu) = modem.prepare(&ring_tone(10)).unwrap().remove(0);
        // TP-VPF relative
        assert_eq!(tpdu[0] & 0x18, 0x10);
    }

    #[test]
    fn test_prepare_encodes_each_segment() {
        let modem = Modem::new(ScriptedLink::default());
        let segments = modem.prepare(&ring_tone(300)).unwrap();
        assert_eq!(segments.len(), 3);
        for (index, (pdu, tpdu)) in segments.iter().enumerate() {
            assert_eq!(pdu.concat_info().unwrap().part_index as usize, index + 1);
            assert_eq!(tpdu[0] & 0x40, 0x40);
        }
    }
}
