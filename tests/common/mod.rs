//! Hand-built ZIP fixtures for integration tests.
//!
//! Writes real LFH/CDFH/EOCD records with correct CRCs, so fixtures
//! exercise the same byte layout the reader parses in production.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};

pub const STORED: u16 = 0;
pub const DEFLATED: u16 = 8;

/// One fixture member: (entry name, uncompressed content, method).
///
/// Methods other than `STORED`/`DEFLATED` store the content raw under
/// the given method id, producing an entry the scanner must skip.
pub type Member<'a> = (&'a str, &'a [u8], u16);

/// One pre-encoded fixture member: (entry name, stored bytes, method).
///
/// The stored bytes go into the archive untouched, so a deliberately
/// truncated or corrupted payload can be declared under any method.
pub type RawMember<'a> = (&'a str, &'a [u8], u16);

pub fn build_zip(members: &[Member]) -> Vec<u8> {
    build_zip_with_comment(members, b"")
}

pub fn build_zip_with_comment(members: &[Member], comment: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut central = Vec::new();

    for (name, data, method) in members {
        let mut crc = Crc::new();
        crc.update(data);

        let stored: Vec<u8> = if *method == DEFLATED {
            deflate(data)
        } else {
            data.to_vec()
        };
        append_member(&mut buf, &mut central, name, &stored, crc.sum(), *method);
    }

    finish_zip(buf, central, members.len(), comment)
}

/// Build an archive from members whose stored bytes are supplied
/// verbatim. CRCs are zeroed; the scanner does not verify them.
pub fn build_zip_raw(members: &[RawMember]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut central = Vec::new();

    for (name, stored, method) in members {
        append_member(&mut buf, &mut central, name, stored, 0, *method);
    }

    finish_zip(buf, central, members.len(), b"")
}

/// Raw-deflate `data` the way a ZIP writer would.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Write fixture bytes to a temp file that lives as long as the
/// returned guard.
pub fn write_zip(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn append_member(
    buf: &mut Vec<u8>,
    central: &mut Vec<u8>,
    name: &str,
    stored: &[u8],
    crc32: u32,
    method: u16,
) {
    let lfh_offset = buf.len() as u32;

    // Local File Header
    buf.extend_from_slice(b"PK\x03\x04");
    push16(buf, 20); // version needed
    push16(buf, 0); // flags
    push16(buf, method);
    push16(buf, 0); // mod time
    push16(buf, 0); // mod date
    push32(buf, crc32);
    push32(buf, stored.len() as u32);
    push32(buf, stored.len() as u32); // uncompressed size (informational)
    push16(buf, name.len() as u16);
    push16(buf, 0); // extra length
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(stored);

    // Central Directory File Header
    central.extend_from_slice(b"PK\x01\x02");
    push16(central, 20); // version made by
    push16(central, 20); // version needed
    push16(central, 0); // flags
    push16(central, method);
    push16(central, 0); // mod time
    push16(central, 0); // mod date
    push32(central, crc32);
    push32(central, stored.len() as u32);
    push32(central, stored.len() as u32);
    push16(central, name.len() as u16);
    push16(central, 0); // extra length
    push16(central, 0); // comment length
    push16(central, 0); // disk number start
    push16(central, 0); // internal attributes
    push32(central, 0); // external attributes
    push32(central, lfh_offset);
    central.extend_from_slice(name.as_bytes());
}

fn finish_zip(mut buf: Vec<u8>, central: Vec<u8>, count: usize, comment: &[u8]) -> Vec<u8> {
    let cd_offset = buf.len() as u32;
    let cd_size = central.len() as u32;
    buf.extend_from_slice(&central);

    // End of Central Directory
    buf.extend_from_slice(b"PK\x05\x06");
    push16(&mut buf, 0); // disk number
    push16(&mut buf, 0); // disk with central directory
    push16(&mut buf, count as u16);
    push16(&mut buf, count as u16);
    push32(&mut buf, cd_size);
    push32(&mut buf, cd_offset);
    push16(&mut buf, comment.len() as u16);
    buf.extend_from_slice(comment);

    buf
}

fn push16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}
