//! Recording test doubles shared by the unit tests
use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;

use crate::cmd::Cmd;
use crate::interface::PixelBus;
use crate::window::Rect;

/// Line-level activity on the bus
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Select,
    Deselect,
    DataMode(bool),
    Transfer(Vec<u8>),
    FullDuplex(Vec<u8>),
}

/// A completed transfer, classified by the D/C level it was sent with
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Command(u8),
    Data(Vec<u8>),
    Read(u8),
}

/// A window armed by CASET/PASET/RAMWR and the pixel bytes that followed it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub window: Rect,
    pub data: Vec<u8>,
}

/// A [`PixelBus`] that records everything sent through it
#[derive(Default)]
pub struct RecordingBus {
    pub events: Vec<BusEvent>,
    pub log: Vec<Transaction>,
    pub readback: [u8; 5],
    /// Fail every transfer once this many have succeeded
    pub fail_after: Option<usize>,
    pub selected: bool,
    data_mode: bool,
    transfers: usize,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Command(c) | Transaction::Read(c) => Some(*c),
                Transaction::Data(_) => None,
            })
            .collect()
    }

    pub fn count_command(&self, opcode: u8) -> usize {
        self.commands().iter().filter(|&&c| c == opcode).count()
    }

    /// Parameter bytes sent right after each occurrence of `opcode`
    pub fn params(&self, opcode: u8) -> Vec<Vec<u8>> {
        let mut params = Vec::new();
        for pair in self.log.windows(2) {
            if let [Transaction::Command(c), Transaction::Data(d)] = pair {
                if *c == opcode {
                    params.push(d.clone());
                }
            }
        }
        params
    }

    /// Every armed window together with the pixel bytes streamed into it
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut columns = (0u16, 0u16);
        let mut rows = (0u16, 0u16);
        let mut pending: Option<u8> = None;
        let mut current: Option<Segment> = None;

        for transaction in &self.log {
            match transaction {
                Transaction::Command(c) | Transaction::Read(c) => {
                    if let Some(segment) = current.take() {
                        segments.push(segment);
                    }
                    if *c == Cmd::MEMORY_WRITE {
                        current = Some(Segment {
                            window: Rect::new(columns.0, rows.0, columns.1, rows.1),
                            data: Vec::new(),
                        });
                        pending = None;
                    } else {
                        pending = Some(*c);
                    }
                }
                Transaction::Data(d) => {
                    if let Some(segment) = current.as_mut() {
                        segment.data.extend_from_slice(d);
                    } else if d.len() == 4 {
                        let first = u16::from_be_bytes([d[0], d[1]]);
                        let last = u16::from_be_bytes([d[2], d[3]]);
                        match pending {
                            Some(Cmd::COLUMN_ADDRESS_SET) => columns = (first, last),
                            Some(Cmd::PAGE_ADDRESS_SET) => rows = (first, last),
                            _ => {}
                        }
                    }
                }
            }
        }
        if let Some(segment) = current {
            segments.push(segment);
        }
        segments
    }

    /// Bytes of every data transfer that followed a memory write
    pub fn pixel_bytes(&self) -> usize {
        self.segments().iter().map(|s| s.data.len()).sum()
    }

    fn check_fault(&mut self) -> Result<(), DisplayError> {
        if let Some(limit) = self.fail_after {
            if self.transfers >= limit {
                return Err(DisplayError::BusWriteError);
            }
        }
        self.transfers += 1;
        Ok(())
    }
}

impl PixelBus for RecordingBus {
    fn select(&mut self) -> Result<(), DisplayError> {
        assert!(!self.selected, "chip selected twice");
        self.selected = true;
        self.events.push(BusEvent::Select);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.selected = false;
        self.events.push(BusEvent::Deselect);
        Ok(())
    }

    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError> {
        self.data_mode = data;
        self.events.push(BusEvent::DataMode(data));
        Ok(())
    }

    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        assert!(self.selected, "transfer without chip select");
        self.check_fault()?;
        self.events.push(BusEvent::Transfer(bytes.to_vec()));
        if self.data_mode {
            self.log.push(Transaction::Data(bytes.to_vec()));
        } else {
            assert_eq!(bytes.len(), 1, "commands are a single byte");
            self.log.push(Transaction::Command(bytes[0]));
        }
        Ok(())
    }

    fn transfer_full_duplex(
        &mut self,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), DisplayError> {
        assert!(self.selected, "transfer without chip select");
        self.check_fault()?;
        self.events.push(BusEvent::FullDuplex(write.to_vec()));
        self.log.push(Transaction::Read(write[0]));
        read.copy_from_slice(&self.readback[..read.len()]);
        Ok(())
    }
}

/// Delay that returns immediately and remembers how long it was asked to wait
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
