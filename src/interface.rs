//! Bus transport and the command/data register protocol
use display_interface::DisplayError;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::Error;

/// Number of bytes clocked in by a read-back transaction
pub const READBACK_LEN: usize = 5;

/// The 4-wire serial transport the driver talks through
///
/// Implementations only move bytes and toggle lines; framing into
/// transactions is done by [`RegisterProtocol`].
pub trait PixelBus {
    /// Assert chip select
    fn select(&mut self) -> Result<(), DisplayError>;

    /// Release chip select
    fn deselect(&mut self) -> Result<(), DisplayError>;

    /// Drive the data/command line: `true` for data, `false` for a command
    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError>;

    /// Write bytes, discarding whatever is clocked in
    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Write `write` while clocking the same number of bytes into `read`
    fn transfer_full_duplex(&mut self, write: &[u8], read: &mut [u8])
        -> Result<(), DisplayError>;
}

impl<T: PixelBus + ?Sized> PixelBus for &mut T {
    fn select(&mut self) -> Result<(), DisplayError> {
        T::select(self)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        T::deselect(self)
    }

    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError> {
        T::set_data_mode(self, data)
    }

    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        T::transfer(self, bytes)
    }

    fn transfer_full_duplex(
        &mut self,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), DisplayError> {
        T::transfer_full_duplex(self, write, read)
    }
}

/// [`PixelBus`] over an embedded-hal SPI bus with dedicated CS and D/C pins
pub struct SpiInterface<SPI, CS, DC> {
    spi: SPI,
    cs: CS,
    dc: DC,
}

impl<SPI, CS, DC> SpiInterface<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Create the interface. Chip select is expected to idle high.
    pub fn new(spi: SPI, cs: CS, dc: DC) -> Self {
        Self { spi, cs, dc }
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, CS, DC) {
        (self.spi, self.cs, self.dc)
    }
}

impl<SPI, CS, DC> PixelBus for SpiInterface<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    fn select(&mut self) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)
    }

    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError> {
        let result = if data {
            self.dc.set_high()
        } else {
            self.dc.set_low()
        };
        result.map_err(|_| DisplayError::DCError)
    }

    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn transfer_full_duplex(
        &mut self,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), DisplayError> {
        self.spi
            .transfer(read, write)
            .and_then(|()| self.spi.flush())
            .map_err(|_| DisplayError::BusWriteError)
    }
}

/// Frames command, data and read-back transactions on a [`PixelBus`]
///
/// Every transaction selects the chip, sets the D/C level, transfers and
/// deselects again, even when the transfer failed.
pub struct RegisterProtocol<B> {
    bus: B,
}

impl<B: PixelBus> RegisterProtocol<B> {
    /// Wrap a bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Send a single command byte
    pub fn write_command(&mut self, opcode: u8) -> Result<(), Error> {
        self.transaction(false, |bus| bus.transfer(&[opcode]))
    }

    /// Send parameter or pixel bytes
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.transaction(true, |bus| bus.transfer(data))
    }

    /// Send a command followed by its parameters, if any
    pub fn cmd_with_data(&mut self, opcode: u8, data: &[u8]) -> Result<(), Error> {
        self.write_command(opcode)?;
        if !data.is_empty() {
            self.write_data(data)?;
        }
        Ok(())
    }

    /// Send `opcode` and clock in four more bytes
    ///
    /// Returns all five bytes received, including the one shifted in while
    /// the opcode went out.
    pub fn read_command(&mut self, opcode: u8) -> Result<[u8; READBACK_LEN], Error> {
        let mut write = [0u8; READBACK_LEN];
        write[0] = opcode;
        let mut read = [0u8; READBACK_LEN];
        self.transaction(false, |bus| bus.transfer_full_duplex(&write, &mut read))?;
        Ok(read)
    }

    fn transaction<F>(&mut self, data: bool, transfer: F) -> Result<(), Error>
    where
        F: FnOnce(&mut B) -> Result<(), DisplayError>,
    {
        self.bus.select()?;
        let result = self
            .bus
            .set_data_mode(data)
            .and_then(|()| transfer(&mut self.bus));
        let released = self.bus.deselect();
        result?;
        released?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, RecordingBus, Transaction};
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::rc::Rc;

    #[test]
    fn command_then_data_framing() {
        let mut protocol = RegisterProtocol::new(RecordingBus::new());
        protocol.cmd_with_data(0x3A, &[0x55]).unwrap();

        let bus = protocol.bus();
        assert_eq!(
            bus.events,
            vec![
                BusEvent::Select,
                BusEvent::DataMode(false),
                BusEvent::Transfer(vec![0x3A]),
                BusEvent::Deselect,
                BusEvent::Select,
                BusEvent::DataMode(true),
                BusEvent::Transfer(vec![0x55]),
                BusEvent::Deselect,
            ]
        );
    }

    #[test]
    fn bare_command_sends_no_data_transaction() {
        let mut protocol = RegisterProtocol::new(RecordingBus::new());
        protocol.cmd_with_data(0x29, &[]).unwrap();
        assert_eq!(protocol.bus().log, vec![Transaction::Command(0x29)]);
    }

    #[test]
    fn read_command_returns_all_clocked_bytes() {
        let mut bus = RecordingBus::new();
        bus.readback = [1, 2, 3, 4, 5];
        let mut protocol = RegisterProtocol::new(bus);

        let data = protocol.read_command(0x2E).unwrap();

        assert_eq!(data, [1, 2, 3, 4, 5]);
        assert_eq!(protocol.bus().log, vec![Transaction::Read(0x2E)]);
        assert!(protocol
            .bus()
            .events
            .contains(&BusEvent::FullDuplex(vec![0x2E, 0, 0, 0, 0])));
    }

    #[test]
    fn failed_transfer_still_deselects() {
        let mut bus = RecordingBus::new();
        bus.fail_after = Some(0);
        let mut protocol = RegisterProtocol::new(bus);

        let err = protocol.read_command(0x2E).unwrap_err();

        assert!(matches!(err, Error::Transport(DisplayError::BusWriteError)));
        assert_eq!(protocol.bus().events.last(), Some(&BusEvent::Deselect));
        assert!(!protocol.bus().selected);
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Line {
        Cs(bool),
        Dc(bool),
        Write(Vec<u8>),
        Transfer(Vec<u8>),
    }

    type Lines = Rc<RefCell<Vec<Line>>>;

    struct FakePin {
        lines: Lines,
        cs: bool,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let line = if self.cs { Line::Cs(false) } else { Line::Dc(false) };
            self.lines.borrow_mut().push(line);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let line = if self.cs { Line::Cs(true) } else { Line::Dc(true) };
            self.lines.borrow_mut().push(line);
            Ok(())
        }
    }

    struct FakeSpi {
        lines: Lines,
        fail: bool,
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = embedded_hal::spi::ErrorKind;
    }

    impl SpiBus for FakeSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(embedded_hal::spi::ErrorKind::Other);
            }
            self.lines.borrow_mut().push(Line::Write(words.to_vec()));
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.lines.borrow_mut().push(Line::Transfer(write.to_vec()));
            for (i, byte) in read.iter_mut().enumerate() {
                *byte = 0xA0 + i as u8;
            }
            Ok(())
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn spi_interface(fail: bool) -> (SpiInterface<FakeSpi, FakePin, FakePin>, Lines) {
        let lines: Lines = Rc::new(RefCell::new(Vec::new()));
        let spi = FakeSpi {
            lines: lines.clone(),
            fail,
        };
        let cs = FakePin {
            lines: lines.clone(),
            cs: true,
        };
        let dc = FakePin {
            lines: lines.clone(),
            cs: false,
        };
        (SpiInterface::new(spi, cs, dc), lines)
    }

    #[test]
    fn spi_interface_toggles_lines_around_writes() {
        let (interface, lines) = spi_interface(false);
        let mut protocol = RegisterProtocol::new(interface);

        protocol.cmd_with_data(0x36, &[0x48]).unwrap();

        assert_eq!(
            *lines.borrow(),
            vec![
                Line::Cs(false),
                Line::Dc(false),
                Line::Write(vec![0x36]),
                Line::Cs(true),
                Line::Cs(false),
                Line::Dc(true),
                Line::Write(vec![0x48]),
                Line::Cs(true),
            ]
        );
    }

    #[test]
    fn spi_interface_full_duplex_read() {
        let (interface, lines) = spi_interface(false);
        let mut protocol = RegisterProtocol::new(interface);

        let data = protocol.read_command(0x2E).unwrap();

        assert_eq!(data, [0xA0, 0xA1, 0xA2, 0xA3, 0xA4]);
        assert!(lines
            .borrow()
            .contains(&Line::Transfer(vec![0x2E, 0, 0, 0, 0])));
    }

    #[test]
    fn spi_write_fault_maps_to_transport_error() {
        let (interface, lines) = spi_interface(true);
        let mut protocol = RegisterProtocol::new(interface);

        let err = protocol.write_command(0x29).unwrap_err();

        assert!(matches!(err, Error::Transport(DisplayError::BusWriteError)));
        assert_eq!(lines.borrow().last(), Some(&Line::Cs(true)));
    }
}
