//! Record rendering
//!
//! Renders one event into the RFC 5424 layout the collector expects:
//!
//! ```text
//! <PRI>1 TIMESTAMP HOST APP PROC MSGID - TEXT [APP key="value" ...]
//! ```
//!
//! Some collectors cannot handle a real STRUCTURED-DATA block, so the
//! parameter list is appended in the message-text position and the
//! structured-data field always carries the `-` NILVALUE. A record that
//! would exceed the slot capacity is truncated at the tail, never rejected.

use core::fmt::{self, Write};

use super::catalog::Event;
use super::ring::Record;

/// Syslog protocol version field
const SYSLOG_VERSION: u8 = 1;

/// `fmt::Write` adapter over a byte buffer that silently truncates once full
pub(crate) struct TruncatingWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> TruncatingWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let space = self.buf.len() - self.len;
        let n = s.len().min(space);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// Dotted-decimal IPv4 display adapter
pub(crate) struct DottedQuad(pub(crate) [u8; 4]);

impl fmt::Display for DottedQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// Render `event` into `record`, replacing its previous contents.
pub fn render<const CAP: usize>(
    record: &mut Record<CAP>,
    event: &Event,
    timestamp: &str,
    host: &str,
    app: &str,
) {
    let template = event.template();
    let mut w = TruncatingWriter::new(record.buf_mut());
    let _ = write!(
        w,
        "<{}>{} {} {} {} {} {}",
        template.severity.priority(),
        SYSLOG_VERSION,
        timestamp,
        host,
        app,
        template.subsystem.tag(),
        event.id() as u8,
    );
    let _ = write!(w, " - {}", template.text);
    write_params(&mut w, event, app);
    let len = w.len();
    record.set_len(len);
}

/// Append the event's parameters in the message-text position.
fn write_params(w: &mut TruncatingWriter<'_>, event: &Event, app: &str) {
    match event {
        Event::WifiConnected { ssid, channel } => {
            let _ = write!(w, " [{} SSID=\"{}\" Channel=\"{}\"]", app, ssid, channel);
        }
        Event::WifiGotIp { ip, mask, gateway } => {
            let _ = write!(
                w,
                " [{} IP=\"{}\" Mask=\"{}\" Gway=\"{}\"]",
                app,
                DottedQuad(*ip),
                DottedQuad(*mask),
                DottedQuad(*gateway),
            );
        }
        Event::WifiDisconnected { ssid, reason } => {
            let _ = write!(w, " [{} SSID=\"{}\" Reason=\"{}\"]", app, ssid, reason);
        }
        Event::WifiEvent { code } => {
            let _ = write!(w, " [{} Event=\"{}\"]", app, code);
        }
        Event::TempReading { tenths } => {
            let sign = if *tenths < 0 { "-" } else { "" };
            let _ = write!(
                w,
                " [{} Temp=\"{}{}.{}degC\"]",
                app,
                sign,
                (tenths / 10).abs(),
                (tenths % 10).abs(),
            );
        }
        Event::FrameSent { frame, micros } => {
            let _ = write!(
                w,
                " [{} Frame=\"{:#010X}\" Time=\"{}us\"]",
                app, frame, micros
            );
        }
        // Events without parameters: the NILVALUE already rendered stands.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    const TS: &str = "2026-01-01T00:00:00Z";
    const HOST: &str = "192.168.1.50";
    const APP: &str = "pico-beacon";

    fn rendered<const CAP: usize>(event: &Event) -> std::string::String {
        let mut record: Record<CAP> = Record::new();
        render(&mut record, event, TS, HOST, APP);
        std::string::String::from_utf8(record.bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_plain_event_layout() {
        let line = rendered::<256>(&Event::SyslogStarted);
        assert_eq!(
            line,
            "<134>1 2026-01-01T00:00:00Z 192.168.1.50 pico-beacon Syslog 0 \
             - Event transport initialized."
        );
    }

    #[test]
    fn test_event_with_parameters() {
        let line = rendered::<256>(&Event::WifiGotIp {
            ip: [192, 168, 1, 50],
            mask: [255, 255, 255, 0],
            gateway: [192, 168, 1, 1],
        });
        assert_eq!(
            line,
            "<133>1 2026-01-01T00:00:00Z 192.168.1.50 pico-beacon WiFi 3 \
             - WiFi obtained IP address. \
             [pico-beacon IP=\"192.168.1.50\" Mask=\"255.255.255.0\" Gway=\"192.168.1.1\"]"
        );
    }

    #[test]
    fn test_wifi_connected_parameters() {
        let ssid: String<32> = String::try_from("HomeNet").unwrap();
        let line = rendered::<256>(&Event::WifiConnected { ssid, channel: 6 });
        assert!(line.ends_with("[pico-beacon SSID=\"HomeNet\" Channel=\"6\"]"));
        assert!(line.starts_with("<133>1 "));
    }

    #[test]
    fn test_temperature_formatting() {
        let line = rendered::<256>(&Event::TempReading { tenths: 123 });
        assert!(line.ends_with("Temp=\"12.3degC\"]"));

        let line = rendered::<256>(&Event::TempReading { tenths: -128 });
        assert!(line.ends_with("Temp=\"-12.8degC\"]"));

        let line = rendered::<256>(&Event::TempReading { tenths: -5 });
        assert!(line.ends_with("Temp=\"-0.5degC\"]"));

        let line = rendered::<256>(&Event::TempReading { tenths: 0 });
        assert!(line.ends_with("Temp=\"0.0degC\"]"));
    }

    #[test]
    fn test_frame_sent_formatting() {
        let line = rendered::<256>(&Event::FrameSent {
            frame: 0x9480_0012,
            micros: 4_310,
        });
        assert!(line.ends_with("[pico-beacon Frame=\"0x94800012\" Time=\"4310us\"]"));
    }

    #[test]
    fn test_truncation_at_capacity() {
        // A 32-byte record cannot hold the full header; the tail is cut,
        // nothing overflows.
        let line = rendered::<32>(&Event::WifiGotIp {
            ip: [192, 168, 1, 50],
            mask: [255, 255, 255, 0],
            gateway: [192, 168, 1, 1],
        });
        assert_eq!(line.len(), 32);
        assert!(line.starts_with("<133>1 2026-01-01T00:00:00Z "));
    }

    #[test]
    fn test_truncation_keeps_leading_fields() {
        let ssid: String<32> =
            String::try_from("a-very-long-network-name-padding").unwrap();
        let line = rendered::<96>(&Event::WifiDisconnected { ssid, reason: 8 });
        assert_eq!(line.len(), 96);
        assert!(line.contains("WiFi 4"));
    }

    #[test]
    fn test_truncating_writer_exact_fit() {
        let mut buf = [0u8; 5];
        let mut w = TruncatingWriter::new(&mut buf);
        let _ = write!(w, "12345");
        assert_eq!(w.len(), 5);
        let _ = write!(w, "678");
        assert_eq!(w.len(), 5);
        assert_eq!(&buf, b"12345");
    }
}
