// ABOUTME: Splits a payload into one or more SMS segments with port addressing and concatenation UDH
// ABOUTME: Accounts header overhead per alphabet and allocates concatenation reference numbers

use crate::codec::CodecError;
use crate::datatypes::{
    CONCAT_ELEMENT_SIZE, ConcatInfo, DataCoding, MAX_USER_DATA_OCTETS, Pdu, UdhElement,
    default_smsc, encode_udh, udh_overhead,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;
use tracing::debug;

/// Highest number of segments a concatenated message may have
pub const MAX_PARTS: usize = u8::MAX as usize;

/// Errors raised while segmenting a payload
///
/// These are caller-fixable: the payload or the fixed header cannot be
/// expressed within the per-segment limits.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// More than 255 segments would be needed
    #[error("Message too long: {parts} parts needed, at most {MAX_PARTS} allowed")]
    MessageTooLong { parts: usize },

    /// The user data header leaves no room for payload
    #[error("User data header of {overhead} octets leaves no room for payload")]
    UdhTooLarge { overhead: usize },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Rotating source of concatenation reference numbers
///
/// Each multi-part message draws one value. The counter wraps after 255, so
/// reference numbers are distinct for the last 256 multi-part messages sent
/// through the same counter.
#[derive(Debug, Default)]
pub struct ReferenceCounter {
    next: AtomicU8,
}

impl ReferenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rotation at `first`
    pub fn starting_at(first: u8) -> Self {
        Self {
            next: AtomicU8::new(first),
        }
    }

    /// Take the next reference number
    pub fn next_reference(&self) -> u8 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Segments payloads into PDUs
///
/// One splitter should be kept per modem link so its reference counter is
/// scoped to the link the segments are sent over.
///
/// # Example
///
/// ```rust
/// use gsm_sms::datatypes::{DataCoding, UdhElement};
/// use gsm_sms::splitter::PduSplitter;
///
/// let splitter = PduSplitter::new();
/// let port = UdhElement::application_port_16bit(5505, 0);
/// let pdus = splitter.split(DataCoding::EightBit, &[port], &[0u8; 300]).unwrap();
/// assert_eq!(pdus.len(), 3);
/// ```
#[derive(Debug)]
pub struct PduSplitter {
    smsc_address: Bytes,
    max_user_data_octets: usize,
    references: ReferenceCounter,
}

impl Default for PduSplitter {
    fn default() -> Self {
        Self {
            smsc_address: default_smsc(),
            max_user_data_octets: MAX_USER_DATA_OCTETS,
            references: ReferenceCounter::new(),
        }
    }
}

impl PduSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// SMSC information field copied into every produced PDU
    pub fn with_smsc_address(mut self, smsc_address: Bytes) -> Self {
        self.smsc_address = smsc_address;
        self
    }

    /// Override the per-PDU user data limit (140 octets for SMS)
    pub fn with_max_user_data_octets(mut self, max_octets: usize) -> Self {
        self.max_user_data_octets = max_octets;
        self
    }

    pub fn with_references(mut self, references: ReferenceCounter) -> Self {
        self.references = references;
        self
    }

    /// Payload units that fit in one segment alongside `fixed_udh` when no
    /// concatenation header is needed
    pub fn single_segment_capacity(&self, data_coding: DataCoding, fixed_udh: &[UdhElement]) -> usize {
        data_coding.capacity(self.max_user_data_octets, udh_overhead(fixed_udh))
    }

    /// Payload units per segment once a concatenation element is added
    pub fn multi_segment_capacity(&self, data_coding: DataCoding, fixed_udh: &[UdhElement]) -> usize {
        // The UDHL byte is only paid once, whether or not fixed elements exist
        let overhead = udh_overhead(fixed_udh).max(1) + CONCAT_ELEMENT_SIZE;
        data_coding.capacity(self.max_user_data_octets, overhead)
    }

    /// Split `payload` into ordered PDUs.
    ///
    /// A payload that fits alongside `fixed_udh` yields exactly one PDU with
    /// the fixed header only. Otherwise every segment carries the fixed
    /// elements followed by a concatenation element sharing one reference
    /// number, with part indices `1..=total`.
    ///
    /// The payload is counted in septets (one per byte) for the 7-bit
    /// alphabet and in octets otherwise.
    pub fn split(
        &self,
        data_coding: DataCoding,
        fixed_udh: &[UdhElement],
        payload: &[u8],
    ) -> Result<Vec<Pdu>, EncodingError> {
        let overhead = udh_overhead(fixed_udh);
        if overhead > self.max_user_data_octets {
            return Err(EncodingError::UdhTooLarge { overhead });
        }

        let single_capacity = self.single_segment_capacity(data_coding, fixed_udh);
        if payload.len() <= single_capacity {
            debug!(
                "Payload of {} units fits in a single {} segment",
                payload.len(),
                data_coding
            );
            return Ok(vec![self.build(data_coding, fixed_udh, payload)?]);
        }

        let multi_capacity = self.multi_segment_capacity(data_coding, fixed_udh);
        if multi_capacity == 0 {
            return Err(EncodingError::UdhTooLarge {
                overhead: overhead.max(1) + CONCAT_ELEMENT_SIZE,
            });
        }

        let total_parts = payload.len().div_ceil(multi_capacity);
        if total_parts > MAX_PARTS {
            return Err(EncodingError::MessageTooLong { parts: total_parts });
        }

        let reference = self.references.next_reference();
        debug!(
            "Splitting {} units into {} segments of up to {} (reference {})",
            payload.len(),
            total_parts,
            multi_capacity,
            reference
        );

        let mut elements = Vec::with_capacity(fixed_udh.len() + 1);
        payload
            .chunks(multi_capacity)
            .enumerate()
            .map(|(index, chunk)| {
                let info = ConcatInfo::new(reference, total_parts as u8, (index + 1) as u8)?;
                elements.clear();
                elements.extend_from_slice(fixed_udh);
                elements.push(UdhElement::concatenation(info));
                self.build(data_coding, &elements, chunk)
            })
            .collect()
    }

    fn build(
        &self,
        data_coding: DataCoding,
        elements: &[UdhElement],
        chunk: &[u8],
    ) -> Result<Pdu, EncodingError> {
        let udh_length = udh_overhead(elements);
        let mut buf = BytesMut::with_capacity(udh_length + chunk.len());
        encode_udh(&mut buf, elements)?;
        buf.put_slice(chunk);
        Ok(Pdu::new(
            self.smsc_address.clone(),
            data_coding,
            buf.freeze(),
            udh_length,
        ))
    }
}
