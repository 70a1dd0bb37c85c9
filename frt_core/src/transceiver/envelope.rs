/// Additional data carried alongside every message.
///
/// The width is fixed per build; enable the `additional-data-64` feature for
/// a 64-bit field.
#[cfg(feature = "additional-data-64")]
pub type AdditionalData = u64;

/// Additional data carried alongside every message.
///
/// The width is fixed per build; enable the `additional-data-64` feature for
/// a 64-bit field.
#[cfg(not(feature = "additional-data-64"))]
pub type AdditionalData = u32;

/// Fixed-layout message unit moved through a partner queue
///
/// `data` is whatever reference or handle the application exchanges; how it
/// is owned and released is up to the allocate/free callbacks installed on
/// the receiving transceiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<D> {
    pub data: D,
    pub data_type: u8,
    pub additional_data: AdditionalData,
}

impl<D> Envelope<D> {
    pub fn new(data: D, data_type: u8, additional_data: AdditionalData) -> Self {
        Self {
            data,
            data_type,
            additional_data,
        }
    }
}
