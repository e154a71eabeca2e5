//! Interface data polling
//!
//! A poll response payload is `[itf:1][len:2|4 BE][overflow:4 BE]?[data]`.
//! Which fields are present depends on the session's `ModeFlags`, and the
//! data may span more than one bulk transfer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{trace, warn};

use crate::constants::DGI_CMD_INTERFACES_POLL_DATA;
use crate::error::{DgiError, Result};
use crate::session::Session;
use crate::structures::{ModeFlags, PolledFrame};
use crate::transport::Transport;

/// Decoded poll response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollHeader {
    /// Declared data length
    pub length: usize,
    /// Overflow indicator was present and non-zero
    pub overflow: bool,
    /// Offset of the first data byte in the payload
    pub data_offset: usize,
}

impl PollHeader {
    /// Decode the header of a poll response payload
    ///
    /// # Arguments
    /// * `itf` - Interface the poll was issued for
    /// * `payload` - Validated response payload
    /// * `mode` - Mode flags in effect for this poll
    pub fn decode(itf: u8, payload: &[u8], mode: ModeFlags) -> Result<Self> {
        let Some((&echo_itf, rest)) = payload.split_first() else {
            return Err(DgiError::WrongLength {
                expected: 1,
                actual: 0,
            });
        };

        if echo_itf != itf {
            return Err(DgiError::InterfaceMismatch {
                expected: itf,
                actual: echo_itf,
            });
        }

        if rest.len() < mode.poll_header_size() {
            return Err(DgiError::WrongLength {
                expected: 1 + mode.poll_header_size(),
                actual: payload.len(),
            });
        }

        let (length, rest) = if mode.len_32bit {
            let length = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
            (length as usize, &rest[4..])
        } else {
            let length = u16::from_be_bytes([rest[0], rest[1]]);
            (length as usize, &rest[2..])
        };

        let overflow = if mode.overflow_indicator {
            u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) != 0
        } else {
            false
        };

        Ok(Self {
            length,
            overflow,
            data_offset: 1 + mode.poll_header_size(),
        })
    }
}

impl<T: Transport> Session<T> {
    /// Poll buffered data from an interface
    ///
    /// Keeps reading from the transport until the declared number of bytes
    /// has arrived. A zero-length read is retried; a transport error aborts
    /// the poll and drops whatever was accumulated.
    pub fn poll_data(&mut self, itf: u8) -> Result<PolledFrame> {
        let mode = self.mode;

        let payload = self.send_command(DGI_CMD_INTERFACES_POLL_DATA, &[itf])?;
        let header = PollHeader::decode(itf, payload, mode)?;
        let mut data = payload[header.data_offset..].to_vec();

        while data.len() < header.length {
            let len = self.transport.read(&mut self.buf)?;
            trace!(
                "Poll 0x{:02x}: +{} bytes ({}/{})",
                itf,
                len,
                data.len() + len,
                header.length
            );
            data.extend_from_slice(&self.buf[..len]);
        }

        data.truncate(header.length);

        Ok(PolledFrame {
            interface: itf,
            data,
            overflow: header.overflow,
        })
    }

    /// Poll an interface until `running` is cleared
    ///
    /// Non-empty frames are passed to `on_frame`; empty polls sleep for
    /// `idle`. `running` is only checked between polls. Framing errors and
    /// transport timeouts are logged and polling continues; any other
    /// transport error is returned.
    pub fn stream<F>(
        &mut self,
        itf: u8,
        running: &AtomicBool,
        idle: Duration,
        mut on_frame: F,
    ) -> Result<()>
    where
        F: FnMut(&PolledFrame),
    {
        while running.load(Ordering::SeqCst) {
            match self.poll_data(itf) {
                Ok(frame) if frame.is_empty() => thread::sleep(idle),
                Ok(frame) => on_frame(&frame),
                Err(e) if e.is_framing_error() || e.is_timeout() => {
                    warn!("Polling data error: {}", e);
                    thread::sleep(idle);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        DGI_CMD_SET_MODE, DGI_ITF_ID_SPI, DGI_MODE_4BYTES_LEN, DGI_MODE_OVERFLOW_INDICATOR,
        DGI_RESP_DATA, DGI_RESP_OK,
    };
    use crate::transport::mock::MockTransport;

    const NARROW: ModeFlags = ModeFlags {
        len_32bit: false,
        overflow_indicator: false,
    };

    const WIDE: ModeFlags = ModeFlags {
        len_32bit: true,
        overflow_indicator: true,
    };

    fn session_in_mode(mut mock: MockTransport, mode: u8) -> Session<MockTransport> {
        mock.reads
            .push_front(Ok(vec![DGI_CMD_SET_MODE, DGI_RESP_OK]));
        let mut session = Session::new(mock);
        session.set_mode(mode).unwrap();
        session
    }

    fn poll_response(payload: &[u8]) -> Vec<u8> {
        let mut raw = vec![DGI_CMD_INTERFACES_POLL_DATA, DGI_RESP_DATA];
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn test_header_narrow() {
        let header = PollHeader::decode(0x20, &[0x20, 0x00, 0x05, b'h'], NARROW).unwrap();
        assert_eq!(header.length, 5);
        assert!(!header.overflow);
        assert_eq!(header.data_offset, 3);
    }

    #[test]
    fn test_header_wide() {
        let payload = [0x20, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
        let header = PollHeader::decode(0x20, &payload, WIDE).unwrap();
        assert_eq!(header.length, 0x0001_0000);
        assert!(header.overflow);
        assert_eq!(header.data_offset, 9);
    }

    #[test]
    fn test_header_mixed_modes() {
        // 2-byte length with overflow indicator
        let mode = ModeFlags {
            len_32bit: false,
            overflow_indicator: true,
        };
        let header =
            PollHeader::decode(0x21, &[0x21, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00], mode).unwrap();
        assert_eq!(header.length, 0x0100);
        assert!(!header.overflow);
        assert_eq!(header.data_offset, 7);
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            PollHeader::decode(0x20, &[0x21, 0x00, 0x00], NARROW),
            Err(DgiError::InterfaceMismatch {
                expected: 0x20,
                actual: 0x21
            })
        ));
        assert!(matches!(
            PollHeader::decode(0x20, &[0x20, 0x00], NARROW),
            Err(DgiError::WrongLength {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            PollHeader::decode(0x20, &[0x20, 0x00, 0x00, 0x00, 0x00], WIDE),
            Err(DgiError::WrongLength {
                expected: 9,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_poll_single_read() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x05hello"));
        let mut session = Session::new(mock);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert_eq!(frame.interface, DGI_ITF_ID_SPI);
        assert_eq!(frame.data, b"hello");
        assert!(!frame.overflow);
        assert_eq!(session.transport().read_calls, 1);
        assert_eq!(session.transport().writes[0], [0x15, 0x00, 0x01, 0x20]);
    }

    #[test]
    fn test_poll_wide_with_overflow() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(
            b"\x20\x00\x00\x00\x03\x00\x00\x00\x01abc",
        ));
        let mut session = session_in_mode(mock, DGI_MODE_4BYTES_LEN | DGI_MODE_OVERFLOW_INDICATOR);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert_eq!(frame.data, b"abc");
        assert!(frame.overflow);
    }

    #[test]
    fn test_poll_accumulates_reads() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x0Bhel"))
            .push_read(b"lo ")
            .push_read(b"")
            .push_read(b"world");
        let mut session = Session::new(mock);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert_eq!(frame.data, b"hello world");
        assert_eq!(frame.len(), 11);
        assert_eq!(session.transport().read_calls, 4);
    }

    #[test]
    fn test_poll_small_buffer() {
        // Receive buffer smaller than the data forces many reads
        let data: Vec<u8> = (0..40).collect();
        let mut first = poll_response(&[0x20, 0x00, 40]);
        first.extend_from_slice(&data[..3]);

        let mut mock = MockTransport::new();
        mock.push_read(&first);
        for chunk in data[3..].chunks(8) {
            mock.push_read(chunk);
        }
        let mut session = Session::with_buffer_size(mock, 8);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert_eq!(frame.data, data);
        assert_eq!(session.transport().read_calls, 6);
    }

    #[test]
    fn test_poll_truncates_to_declared_length() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x04ab"))
            .push_read(b"cdXYZ");
        let mut session = Session::new(mock);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert_eq!(frame.data, b"abcd");
    }

    #[test]
    fn test_poll_empty() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x00"));
        let mut session = Session::new(mock);

        let frame = session.poll_data(DGI_ITF_ID_SPI).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_poll_transport_error_discards_data() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x08abc"))
            .push_error(DgiError::BulkTransfer(rusb::Error::Pipe));
        let mut session = Session::new(mock);

        assert!(matches!(
            session.poll_data(DGI_ITF_ID_SPI),
            Err(DgiError::BulkTransfer(rusb::Error::Pipe))
        ));
    }

    #[test]
    fn test_poll_interface_mismatch() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x21\x00\x01a"));
        let mut session = Session::new(mock);

        assert!(matches!(
            session.poll_data(DGI_ITF_ID_SPI),
            Err(DgiError::InterfaceMismatch { .. })
        ));
    }

    #[test]
    fn test_stream_until_stopped() {
        let mut mock = MockTransport::new();
        mock.push_read(&poll_response(b"\x20\x00\x00"))
            .push_read(&poll_response(b"\x21\x00\x00"))
            .push_read(&poll_response(b"\x20\x00\x03abc"))
            .push_read(&poll_response(b"\x20\x00\x03def"));
        let mut session = Session::new(mock);

        let running = AtomicBool::new(true);
        let mut received = Vec::new();
        session
            .stream(DGI_ITF_ID_SPI, &running, Duration::ZERO, |frame| {
                received.extend_from_slice(&frame.data);
                if received.len() >= 6 {
                    running.store(false, Ordering::SeqCst);
                }
            })
            .unwrap();

        assert_eq!(received, b"abcdef");
        assert_eq!(session.transport().writes.len(), 4);
    }

    #[test]
    fn test_stream_stops_on_transport_error() {
        let mut mock = MockTransport::new();
        mock.push_error(DgiError::ReadTimeout)
            .push_error(DgiError::BulkTransfer(rusb::Error::NoDevice));
        let mut session = Session::new(mock);

        let running = AtomicBool::new(true);
        let result = session.stream(DGI_ITF_ID_SPI, &running, Duration::ZERO, |_| {});
        assert!(matches!(
            result,
            Err(DgiError::BulkTransfer(rusb::Error::NoDevice))
        ));
        assert_eq!(session.transport().read_calls, 2);
    }

    #[test]
    fn test_stream_not_running() {
        let mut session = Session::new(MockTransport::new());
        let running = AtomicBool::new(false);

        session
            .stream(DGI_ITF_ID_SPI, &running, Duration::ZERO, |_| {})
            .unwrap();
        assert!(session.transport().writes.is_empty());
    }
}
