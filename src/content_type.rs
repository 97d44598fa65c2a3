//! Content-type tags for RDF and SPARQL payloads

use std::fmt;

/// Serialization formats understood by the server.
///
/// Every RDF-bearing request and response carries one of these explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    // RDF serializations
    Turtle,
    NTriples,
    NQuads,
    RdfXml,
    JsonLd,
    TriG,
    TriX,
    BinaryRdf,
    RdfJson,
    N3,

    // SPARQL
    SparqlQuery,
    SparqlUpdate,
    SparqlResultsJson,
    SparqlResultsXml,
    BinaryResults,

    /// RDF4J transaction document
    Transaction,

    // Generic
    Json,
    Form,
    Text,
}

impl ContentType {
    /// MIME type string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Turtle => "text/turtle",
            ContentType::NTriples => "application/n-triples",
            ContentType::NQuads => "application/n-quads",
            ContentType::RdfXml => "application/rdf+xml",
            ContentType::JsonLd => "application/ld+json",
            ContentType::TriG => "application/trig",
            ContentType::TriX => "application/trix",
            ContentType::BinaryRdf => "application/x-binary-rdf",
            ContentType::RdfJson => "application/rdf+json",
            ContentType::N3 => "text/n3",
            ContentType::SparqlQuery => "application/sparql-query",
            ContentType::SparqlUpdate => "application/sparql-update",
            ContentType::SparqlResultsJson => "application/sparql-results+json",
            ContentType::SparqlResultsXml => "application/sparql-results+xml",
            ContentType::BinaryResults => "application/x-binary-rdf-results-table",
            ContentType::Transaction => "application/x-rdftransaction",
            ContentType::Json => "application/json",
            ContentType::Form => "application/x-www-form-urlencoded",
            ContentType::Text => "text/plain",
        }
    }

    /// Parse a MIME type, ignoring parameters such as `charset`
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
        let tag = match essence.as_str() {
            "text/turtle" | "application/x-turtle" => ContentType::Turtle,
            "application/n-triples" | "text/plain+ntriples" => ContentType::NTriples,
            "application/n-quads" | "text/x-nquads" => ContentType::NQuads,
            "application/rdf+xml" => ContentType::RdfXml,
            "application/ld+json" => ContentType::JsonLd,
            "application/trig" | "application/x-trig" => ContentType::TriG,
            "application/trix" => ContentType::TriX,
            "application/x-binary-rdf" => ContentType::BinaryRdf,
            "application/rdf+json" => ContentType::RdfJson,
            "text/n3" | "text/rdf+n3" => ContentType::N3,
            "application/sparql-query" => ContentType::SparqlQuery,
            "application/sparql-update" => ContentType::SparqlUpdate,
            "application/sparql-results+json" => ContentType::SparqlResultsJson,
            "application/sparql-results+xml" => ContentType::SparqlResultsXml,
            "application/x-binary-rdf-results-table" => ContentType::BinaryResults,
            "application/x-rdftransaction" => ContentType::Transaction,
            "application/json" => ContentType::Json,
            "application/x-www-form-urlencoded" => ContentType::Form,
            "text/plain" => ContentType::Text,
            _ => return None,
        };
        Some(tag)
    }

    /// Whether this tag names an RDF graph serialization
    pub fn is_rdf(&self) -> bool {
        matches!(
            self,
            ContentType::Turtle
                | ContentType::NTriples
                | ContentType::NQuads
                | ContentType::RdfXml
                | ContentType::JsonLd
                | ContentType::TriG
                | ContentType::TriX
                | ContentType::BinaryRdf
                | ContentType::RdfJson
                | ContentType::N3
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
