//! DHCP payload parser.
//!
//! Parses raw DHCP payloads (RFC 2131 wire format) into domain types.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;

use crate::domain::options::option_codes;
use crate::domain::{DhcpMessage, DhcpOption, Operation, DHCP_MAGIC_COOKIE, FIXED_HEADER_LEN};
use crate::error::DecodeError;

/// Offset of the options region, right after the magic cookie.
const OPTIONS_OFFSET: usize = FIXED_HEADER_LEN + 4;

/// Parse a DHCP message from a UDP payload.
///
/// Returns `Ok(None)` when the bytes are not a DHCP message at all (too
/// short, missing magic cookie, operation code outside Request/Reply);
/// that is the common case on a busy segment and not an error. A payload
/// that passes those checks but has a structurally broken options region
/// fails with a `DecodeError`.
pub fn parse_message(data: &[u8]) -> Result<Option<DhcpMessage>, DecodeError> {
    if data.len() < OPTIONS_OFFSET {
        return Ok(None);
    }

    if data[FIXED_HEADER_LEN..OPTIONS_OFFSET] != DHCP_MAGIC_COOKIE {
        return Ok(None);
    }

    let operation = match Operation::from_u8(data[0]) {
        Some(operation) => operation,
        None => return Ok(None),
    };

    let hardware_type = data[1];
    // hlen at [2] is implied by the chaddr convention below, hops at [3]
    let hops = data[3];
    let xid = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let secs = u16::from_be_bytes([data[8], data[9]]);
    let flags = u16::from_be_bytes([data[10], data[11]]);

    let ciaddr = parse_addr(&data[12..16]);
    let yiaddr = parse_addr(&data[16..20]);
    let siaddr = parse_addr(&data[20..24]);
    let giaddr = parse_addr(&data[24..28]);

    // chaddr is a 16-byte field; the first 6 bytes carry the MAC for
    // Ethernet (htype=1, hlen=6), the rest is padding
    let chaddr = MacAddr6::new(data[28], data[29], data[30], data[31], data[32], data[33]);

    // Server name (sname), 64 bytes at offset 44
    let sname = parse_null_terminated_string(&data[44..108]);

    // Boot filename (file), 128 bytes at offset 108
    let file = parse_null_terminated_string(&data[108..FIXED_HEADER_LEN]);

    let options = parse_options(&data[OPTIONS_OFFSET..])?;

    Ok(Some(DhcpMessage {
        operation,
        hardware_type,
        hops,
        xid,
        secs,
        flags,
        ciaddr,
        yiaddr,
        siaddr,
        giaddr,
        chaddr,
        sname,
        file,
        options,
    }))
}

/// Zero-check boundary: 0.0.0.0 on the wire means "absent".
fn parse_addr(data: &[u8]) -> Option<Ipv4Addr> {
    let addr = Ipv4Addr::new(data[0], data[1], data[2], data[3]);
    if addr.is_unspecified() {
        None
    } else {
        Some(addr)
    }
}

/// Parse a null-terminated string, returning None if empty.
fn parse_null_terminated_string(data: &[u8]) -> Option<String> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    if end == 0 {
        return None;
    }

    String::from_utf8(data[..end].to_vec()).ok()
}

/// Parse the options region.
///
/// Pad bytes are skipped, End stops the walk and is kept in the sequence.
fn parse_options(data: &[u8]) -> Result<Vec<DhcpOption>, DecodeError> {
    let mut options = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let code = data[offset];

        if code == option_codes::PAD {
            offset += 1;
            continue;
        }

        if code == option_codes::END {
            options.push(DhcpOption::End);
            break;
        }

        // Regular option: code + length + data
        if offset + 1 >= data.len() {
            return Err(DecodeError::OptionLengthMissing { code, offset });
        }

        let len = data[offset + 1] as usize;

        if offset + 2 + len > data.len() {
            return Err(DecodeError::OptionTruncated {
                code,
                offset,
                declared: len,
                remaining: data.len() - offset - 2,
            });
        }

        options.push(DhcpOption::from_wire(code, &data[offset + 2..offset + 2 + len]));

        offset += 2 + len;
    }

    Ok(options)
}
