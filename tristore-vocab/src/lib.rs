//! Vocabulary constants for tristore
//!
//! Datatype IRIs the value codec knows how to encode:
//! - `ns` - namespace IRIs
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)

/// Namespace IRIs
pub mod ns {
    /// XSD namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
}

/// Strip the XSD namespace from a datatype IRI, returning the local name.
///
/// Returns `None` for IRIs outside the XSD namespace.
pub fn xsd_local_name(iri: &str) -> Option<&str> {
    iri.strip_prefix(ns::XSD)
}
