//! Built-in catalog of HTTP error kinds.
//!
//! The catalog is closed over the well-known 4xx and 5xx statuses. Each entry
//! carries its status, a `snake_case` symbolic code, a `PascalCase` display
//! name and the default human message. Status, code and name are each unique
//! across the whole table.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

/// One fixed description of an HTTP error kind.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub status: u16,
    pub code: &'static str,
    pub name: &'static str,
    pub message: &'static str,
}

/// Whether an entry is a client (4xx) or server (5xx) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Client,
    Server,
}

impl CatalogEntry {
    const fn new(
        status: u16,
        code: &'static str,
        name: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            status,
            code,
            name,
            message,
        }
    }

    pub fn class(&self) -> ErrorClass {
        if self.status < 500 {
            ErrorClass::Client
        } else {
            ErrorClass::Server
        }
    }
}

#[rustfmt::skip]
pub static CLIENT_ERRORS: &[CatalogEntry] = &[
    CatalogEntry::new(400, "bad_request",                     "BadRequest",                   "Bad Request"),
    CatalogEntry::new(401, "unauthorized",                    "Unauthorized",                 "Unauthorized"),
    CatalogEntry::new(402, "payment_required",                "PaymentRequired",              "Payment Required"),
    CatalogEntry::new(403, "forbidden",                       "Forbidden",                    "Forbidden"),
    CatalogEntry::new(404, "not_found",                       "NotFound",                     "Not Found"),
    CatalogEntry::new(405, "method_not_allowed",              "MethodNotAllowed",             "Method Not Allowed"),
    CatalogEntry::new(406, "not_acceptable",                  "NotAcceptable",                "Not Acceptable"),
    CatalogEntry::new(407, "proxy_authentication_required",   "ProxyAuthenticationRequired",  "Proxy Authentication Required"),
    CatalogEntry::new(408, "request_timeout",                 "RequestTimeout",               "Request Timeout"),
    CatalogEntry::new(409, "conflict",                        "Conflict",                     "Conflict"),
    CatalogEntry::new(410, "gone",                            "Gone",                         "Gone"),
    CatalogEntry::new(411, "length_required",                 "LengthRequired",               "Length Required"),
    CatalogEntry::new(412, "precondition_failed",             "PreconditionFailed",           "Precondition Failed"),
    CatalogEntry::new(413, "request_entity_too_large",        "RequestEntityTooLarge",        "Request Entity Too Large"),
    CatalogEntry::new(414, "request_uri_too_long",            "RequestUriTooLong",            "Request Uri Too Long"),
    CatalogEntry::new(415, "unsupported_media_type",          "UnsupportedMediaType",         "Unsupported Media Type"),
    CatalogEntry::new(416, "requested_range_not_satisfiable", "RequestedRangeNotSatisfiable", "Requested Range Not Satisfiable"),
    CatalogEntry::new(417, "expectation_failed",              "ExpectationFailed",            "Expectation Failed"),
    CatalogEntry::new(421, "misdirected_request",             "MisdirectedRequest",           "Misdirected Request"),
    CatalogEntry::new(422, "unprocessable_entity",            "UnprocessableEntity",          "Unprocessable Entity"),
    CatalogEntry::new(423, "locked",                          "Locked",                       "Locked"),
    CatalogEntry::new(424, "failed_dependency",               "FailedDependency",             "Failed Dependency"),
    CatalogEntry::new(425, "too_early",                       "TooEarly",                     "Too Early"),
    CatalogEntry::new(426, "upgrade_required",                "UpgradeRequired",              "Upgrade Required"),
    CatalogEntry::new(428, "precondition_required",           "PreconditionRequired",         "Precondition Required"),
    CatalogEntry::new(429, "too_many_requests",               "TooManyRequests",              "Too Many Requests"),
    CatalogEntry::new(431, "request_header_fields_too_large", "RequestHeaderFieldsTooLarge",  "Request Header Fields Too Large"),
    CatalogEntry::new(451, "unavailable_for_legal_reasons",   "UnavailableForLegalReasons",   "Unavailable for Legal Reasons"),
];

#[rustfmt::skip]
pub static SERVER_ERRORS: &[CatalogEntry] = &[
    CatalogEntry::new(500, "internal_server_error",           "InternalServerError",           "Internal Server Error"),
    CatalogEntry::new(501, "not_implemented",                 "NotImplemented",                "Not Implemented"),
    CatalogEntry::new(502, "bad_gateway",                     "BadGateway",                    "Bad Gateway"),
    CatalogEntry::new(503, "service_unavailable",             "ServiceUnavailable",            "Service Unavailable"),
    CatalogEntry::new(504, "gateway_timeout",                 "GatewayTimeout",                "Gateway Timeout"),
    CatalogEntry::new(505, "http_version_not_supported",      "HttpVersionNotSupported",       "HTTP Version Not Supported"),
    CatalogEntry::new(506, "variant_also_negotiates",         "VariantAlsoNegotiates",         "Variant Also Negotiates"),
    CatalogEntry::new(507, "insufficient_storage",            "InsufficientStorage",           "Insufficient Storage"),
    CatalogEntry::new(508, "loop_detected",                   "LoopDetected",                  "Loop Detected"),
    CatalogEntry::new(509, "bandwidth_limit_exceeded",        "BandwidthLimitExceeded",        "Bandwidth Limit Exceeded"),
    CatalogEntry::new(510, "not_extended",                    "NotExtended",                   "Not Extended"),
    CatalogEntry::new(511, "network_authentication_required", "NetworkAuthenticationRequired", "Network Authentication Required"),
];

/// All entries, client errors first, each group in ascending status order.
pub fn entries() -> impl Iterator<Item = &'static CatalogEntry> {
    CLIENT_ERRORS.iter().chain(SERVER_ERRORS.iter())
}

static STATUS_MAP: LazyLock<HashMap<u16, &'static CatalogEntry>> =
    LazyLock::new(|| entries().map(|e| (e.status, e)).collect());

static CODE_MAP: LazyLock<HashMap<&'static str, &'static CatalogEntry>> =
    LazyLock::new(|| entries().map(|e| (e.code, e)).collect());

static NAME_MAP: LazyLock<HashMap<&'static str, &'static CatalogEntry>> =
    LazyLock::new(|| entries().map(|e| (e.name, e)).collect());

pub fn by_status(status: u16) -> Option<&'static CatalogEntry> {
    STATUS_MAP.get(&status).copied()
}

pub fn by_code(code: &str) -> Option<&'static CatalogEntry> {
    CODE_MAP.get(code).copied()
}

pub fn by_name(name: &str) -> Option<&'static CatalogEntry> {
    NAME_MAP.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_status_code_and_name_are_unique() {
        let total = entries().count();

        let statuses: HashSet<_> = entries().map(|e| e.status).collect();
        let codes: HashSet<_> = entries().map(|e| e.code).collect();
        let names: HashSet<_> = entries().map(|e| e.name).collect();

        assert_eq!(statuses.len(), total);
        assert_eq!(codes.len(), total);
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_fields_are_non_empty() {
        for entry in entries() {
            assert!(!entry.code.is_empty(), "{} has empty code", entry.status);
            assert!(!entry.name.is_empty(), "{} has empty name", entry.status);
            assert!(!entry.message.is_empty(), "{} has empty message", entry.status);
        }
    }

    #[test]
    fn test_groups_are_closed_over_their_ranges() {
        assert!(CLIENT_ERRORS.iter().all(|e| (400..500).contains(&e.status)));
        assert!(SERVER_ERRORS.iter().all(|e| (500..600).contains(&e.status)));
        assert_eq!(CLIENT_ERRORS.len(), 28);
        assert_eq!(SERVER_ERRORS.len(), 12);
    }

    #[test]
    fn test_required_entries_present() {
        for status in [400, 401, 403, 404, 405, 409, 422, 429, 500, 502, 503, 504] {
            assert!(by_status(status).is_some(), "missing {status}");
        }
    }

    #[test]
    fn test_indexes_agree() {
        let entry = by_status(404).unwrap();
        assert_eq!(entry.code, "not_found");
        assert_eq!(entry.name, "NotFound");
        assert_eq!(entry.message, "Not Found");
        assert!(std::ptr::eq(entry, by_code("not_found").unwrap()));
        assert!(std::ptr::eq(entry, by_name("NotFound").unwrap()));
    }

    #[test]
    fn test_class() {
        assert_eq!(by_status(429).unwrap().class(), ErrorClass::Client);
        assert_eq!(by_status(503).unwrap().class(), ErrorClass::Server);
    }

    #[test]
    fn test_unknown_lookups() {
        assert!(by_status(9999).is_none());
        assert!(by_code("unknown").is_none());
        assert!(by_name("Teapot").is_none());
    }
}
