//! Local network address discovery and access URL construction.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{Error, Result};

/// Address used to pick the outbound interface. No packet is sent.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Find the address other devices on the LAN can reach us at.
///
/// Connecting a UDP socket does not send anything; it only asks the OS
/// which local interface would route to the probe address.
pub fn discover_local_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .map_err(|e| Error::AddressDiscovery(format!("bind failed: {e}")))?;
    socket
        .connect(PROBE_ADDR)
        .map_err(|e| Error::AddressDiscovery(format!("no route: {e}")))?;
    let addr = socket
        .local_addr()
        .map_err(|e| Error::AddressDiscovery(e.to_string()))?;

    if addr.ip().is_unspecified() {
        return Err(Error::AddressDiscovery("no usable interface".to_string()));
    }
    Ok(addr.ip())
}

/// Like [`discover_local_ip`], falling back to the loopback address.
pub fn local_ip_or_loopback() -> String {
    match discover_local_ip() {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            tracing::warn!("{e}, falling back to loopback");
            Ipv4Addr::LOCALHOST.to_string()
        }
    }
}

/// Build the URL that downloads `file_name` from `host:port`.
///
/// IPv6 hosts are bracketed and the file name is percent-encoded.
#[must_use]
pub fn access_url(host: &str, port: u16, file_name: &str) -> String {
    let host = match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("[{v6}]"),
        _ => host.to_string(),
    };
    format!(
        "http://{host}:{port}/{}",
        utf8_percent_encode(file_name, PATH_SEGMENT)
    )
}
