//! Rendering of probe reports
//!
//! Text output follows the classic probe transcript: a header per probe, a
//! connected notice for stream protocols, then the response or one error line
//! prefixed with the protocol name.

use crate::core::probe::{ExchangeStage, ProbeError, ProbeOutcome, ProbeReport, Protocol};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable transcript
    #[default]
    Text,
    /// One JSON object per probe
    Json,
    /// Transcript with payloads as hex bytes
    Hex,
}

/// Writes probe headers and reports to a sink
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    quiet: bool,
    announced: usize,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            quiet: false,
            announced: 0,
        }
    }

    /// Suppress the per-probe headers
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print the header that precedes a probe
    pub fn announce(&mut self, protocol: Protocol) -> io::Result<()> {
        if self.quiet || self.format == OutputFormat::Json {
            return Ok(());
        }
        if self.announced > 0 {
            writeln!(self.out)?;
        }
        self.announced += 1;
        writeln!(self.out, "Connecting to {} {}...", protocol, protocol.target_noun())
    }

    /// Render one report
    pub fn render(&mut self, report: &ProbeReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = json_report(report);
                writeln!(self.out, "{line}")?;
            }
            OutputFormat::Text | OutputFormat::Hex => self.render_transcript(report)?,
        }
        self.out.flush()
    }

    /// Take back the sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_transcript(&mut self, report: &ProbeReport) -> io::Result<()> {
        let protocol = report.protocol;

        if report.connected() {
            if let Some(notice) = protocol.connected_notice() {
                writeln!(self.out, "{notice}")?;
            }
        }

        match &report.outcome {
            ProbeOutcome::Response(response) => {
                let body = match self.format {
                    OutputFormat::Hex => hex_bytes(&response.payload),
                    _ => response.text(),
                };
                if protocol == Protocol::Http {
                    writeln!(self.out, "HTTP Response:")?;
                    writeln!(self.out, "{body}")
                } else {
                    writeln!(self.out, "{protocol} Response: {body}")
                }
            }
            ProbeOutcome::Failed(err) => writeln!(self.out, "{}", error_line(protocol, err)),
            ProbeOutcome::Unsupported(notice) => writeln!(self.out, "{notice}"),
        }
    }
}

/// The single line printed for a failed probe
pub fn error_line(protocol: Protocol, err: &ProbeError) -> String {
    match err.stage() {
        ExchangeStage::Connect => format!("{protocol} Error: {err}"),
        ExchangeStage::Write => format!("Error sending {protocol} message: {err}"),
        ExchangeStage::Read => format!("Error reading {protocol} response: {err}"),
    }
}

fn hex_bytes(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

fn json_report(report: &ProbeReport) -> serde_json::Value {
    let mut value = serde_json::json!({
        "protocol": report.protocol,
        "endpoint": report.target,
        "elapsed_ms": u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        "timestamp": chrono::Local::now().to_rfc3339(),
    });

    let fields = match &report.outcome {
        ProbeOutcome::Response(response) => serde_json::json!({
            "status": "ok",
            "response": response.text(),
            "hex": hex::encode(&response.payload),
            "length": response.payload.len(),
        }),
        ProbeOutcome::Failed(err) => serde_json::json!({
            "status": "error",
            "kind": err.kind(),
            "stage": err.stage(),
            "error": err.to_string(),
        }),
        ProbeOutcome::Unsupported(notice) => serde_json::json!({
            "status": "unsupported",
            "notice": notice,
        }),
    };

    if let (Some(obj), serde_json::Value::Object(extra)) = (value.as_object_mut(), fields) {
        obj.extend(extra);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::ProbeResponse;
    use std::time::Duration;

    fn report(protocol: Protocol, outcome: ProbeOutcome) -> ProbeReport {
        ProbeReport {
            protocol,
            target: "127.0.0.1:9".to_string(),
            outcome,
            elapsed: Duration::from_millis(3),
        }
    }

    fn render(format: OutputFormat, report: &ProbeReport) -> String {
        let mut reporter = Reporter::new(Vec::new(), format);
        reporter.render(report).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_tcp_response_transcript() {
        let r = report(Protocol::Tcp, ProbeOutcome::Response(ProbeResponse::new("Hello, TCP!")));
        assert_eq!(
            render(OutputFormat::Text, &r),
            "Connected to TCP server.\nTCP Response: Hello, TCP!\n"
        );
    }

    #[test]
    fn test_http_body_on_own_line() {
        let r = report(Protocol::Http, ProbeOutcome::Response(ProbeResponse::new("ok")));
        assert_eq!(render(OutputFormat::Text, &r), "HTTP Response:\nok\n");
    }

    #[test]
    fn test_error_lines_by_stage() {
        let refused = report(Protocol::Tcp, ProbeOutcome::Failed(ProbeError::Connect("refused".into())));
        assert_eq!(render(OutputFormat::Text, &refused), "TCP Error: refused\n");

        let timeout = report(
            Protocol::Udp,
            ProbeOutcome::Failed(ProbeError::Timeout {
                stage: ExchangeStage::Read,
                after_ms: 5000,
            }),
        );
        assert_eq!(
            render(OutputFormat::Text, &timeout),
            "Error reading UDP response: timed out after 5000 ms\n"
        );

        let broken = report(Protocol::Tcp, ProbeOutcome::Failed(ProbeError::Write("broken pipe".into())));
        assert_eq!(
            render(OutputFormat::Text, &broken),
            "Connected to TCP server.\nError sending TCP message: broken pipe\n"
        );
    }

    #[test]
    fn test_hex_payload() {
        let r = report(Protocol::Udp, ProbeOutcome::Response(ProbeResponse::new("PONG")));
        assert_eq!(render(OutputFormat::Hex, &r), "UDP Response: 50 4f 4e 47\n");
    }

    #[test]
    fn test_json_fields() {
        let r = report(Protocol::Udp, ProbeOutcome::Response(ProbeResponse::new("PONG")));
        let line = render(OutputFormat::Json, &r);
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["protocol"], "udp");
        assert_eq!(value["status"], "ok");
        assert_eq!(value["response"], "PONG");
        assert_eq!(value["hex"], "504f4e47");
    }

    #[test]
    fn test_headers_separated_by_blank_line() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Text);
        reporter.announce(Protocol::Http).unwrap();
        reporter.announce(Protocol::Serial).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "Connecting to HTTP server...\n\nConnecting to Serial port...\n");
    }

    #[test]
    fn test_quiet_skips_headers() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Text).quiet(true);
        reporter.announce(Protocol::Tcp).unwrap();
        assert!(reporter.into_inner().is_empty());
    }
}
