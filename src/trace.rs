//! Reference traces.
//!
//! One reference per line, `<R|W> <address>`, with the address in decimal
//! or `0x` hex. Blank lines and `#` comments are skipped.

use std::io::BufRead;

use crate::{error::TraceError, hardware::mmu::Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub operation: Operation,
    pub address: u32,
}

impl Reference {
    pub fn read(address: u32) -> Self {
        Self {
            operation: Operation::Read,
            address,
        }
    }

    pub fn write(address: u32) -> Self {
        Self {
            operation: Operation::Write,
            address,
        }
    }
}

pub fn parse_trace(input: &str) -> Result<Vec<Reference>, TraceError> {
    let mut references = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        if let Some(reference) = parse_line(idx + 1, line)? {
            references.push(reference);
        }
    }
    Ok(references)
}

pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<Reference>, TraceError> {
    let mut references = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        if let Some(reference) = parse_line(idx + 1, &line?)? {
            references.push(reference);
        }
    }
    Ok(references)
}

fn parse_line(line: usize, text: &str) -> Result<Option<Reference>, TraceError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let mut fields = text.split_whitespace();
    let (Some(op), Some(address)) = (fields.next(), fields.next()) else {
        return Err(TraceError::MissingField { line });
    };
    if let Some(extra) = fields.next() {
        return Err(TraceError::TrailingField {
            line,
            token: extra.to_string(),
        });
    }

    let operation = Operation::parse(op).ok_or_else(|| TraceError::InvalidOperation {
        line,
        token: op.to_string(),
    })?;
    let address = parse_address(address).ok_or_else(|| TraceError::InvalidAddress {
        line,
        token: address.to_string(),
    })?;

    Ok(Some(Reference { operation, address }))
}

fn parse_address(token: &str) -> Option<u32> {
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}
