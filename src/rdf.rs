//! Helpers for sending `oxrdf` statements
//!
//! oxrdf terms render in N-Triples syntax through `Display`, so a quad
//! list serializes to N-Quads one line per statement.

use oxrdf::{Quad, Triple};
use std::fmt::Write;

/// Serialize quads as an N-Quads document
pub fn to_nquads(quads: &[Quad]) -> String {
    let mut out = String::new();
    for quad in quads {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{} .", quad);
    }
    out
}

/// Serialize triples as an N-Triples document
pub fn to_ntriples(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        let _ = writeln!(out, "{} .", triple);
    }
    out
}
