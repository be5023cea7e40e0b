mod address;
mod data_coding;
mod pdu;
mod udh;

pub use address::{Address, NumericPlanIndicator, TypeOfNumber, default_smsc};
pub use data_coding::{Alphabet, DataCoding, MAX_USER_DATA_OCTETS, MessageClass};
pub use pdu::Pdu;
pub use udh::{
    CONCAT_ELEMENT_SIZE, ConcatInfo, InformationElementId, UdhElement, encode_udh, parse_udh,
    udh_overhead,
};
