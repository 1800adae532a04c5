//! CSV output formatting.

use super::Report;
use std::io::{self, Write};

/// Write one row per port in CSV format.
pub fn write_csv<W: Write>(out: &mut W, report: &Report<'_>) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "transport", "state", "service", "version"])?;

    for port in &report.result.ports {
        wtr.write_record([
            &port.port_number.to_string(),
            &port.transport.to_string(),
            &port.state.to_string(),
            &port.service_name,
            port.version_info.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample;

    #[test]
    fn test_csv_rows() {
        let result = sample();
        let mut buf = Vec::new();
        write_csv(&mut buf, &Report::unsaved("host.local", &result)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "port,transport,state,service,version");
        assert_eq!(lines[1], "22,tcp,open,ssh,\"OpenSSH 8.9, protocol 2.0\"");
        assert_eq!(lines[2], "53,udp,filtered,domain,");
    }
}
