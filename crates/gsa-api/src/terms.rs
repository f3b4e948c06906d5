// Naming catalog
//
// Wire-level names for feeds, entries, properties and query parameters.
// The client treats all of these as opaque strings.

/// XML namespace of the appliance's `content` extension elements.
pub const GSA_NAMESPACE: &str = "http://schemas.google.com/gsa/2007";
/// Prefix conventionally bound to [`GSA_NAMESPACE`].
pub const GSA_PREFIX: &str = "gsa";
/// Atom namespace used for `feed` and `entry` documents.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Feed names.
pub mod feeds {
    pub const COLLECTION: &str = "collection";
    pub const COMMAND: &str = "command";
    pub const CONFIG: &str = "config";
    pub const CONNECTOR_MANAGER: &str = "connectorManager";
    pub const CONTENT_STATISTICS: &str = "contentStatistics";
    pub const DIAGNOSTICS: &str = "diagnostics";
    pub const FEED: &str = "feed";
    pub const FRONTEND: &str = "frontend";
    pub const INFO: &str = "info";
    pub const KEYMATCH: &str = "keymatch";
    pub const LOGS: &str = "logs";
    pub const ONEBOX: &str = "onebox";
    pub const OUTPUT_FORMAT: &str = "outputFormat";
    pub const POLICY_ACLS: &str = "policyAcls";
    pub const SEARCH_LOG: &str = "searchLog";
    pub const SEARCH_REPORT: &str = "searchReport";
    pub const STATUS: &str = "status";
    pub const SYNONYM: &str = "synonym";
}

/// Entry ids.
pub mod entries {
    pub const CRAWL_SCHEDULE: &str = "crawlSchedule";
    pub const CRAWL_URLS: &str = "crawlURLs";
    pub const DOCUMENT_STATUS: &str = "documentStatus";
    pub const FRESHNESS: &str = "freshness";
    pub const HOST_LOAD: &str = "hostLoad";
    pub const LICENSE_INFO: &str = "licenseInfo";
    pub const PAUSE_CRAWL: &str = "pauseCrawl";
    pub const RECRAWL_NOW: &str = "recrawlNow";
    pub const RESET_INDEX: &str = "resetIndex";
    pub const SERVING_STATUS: &str = "servingStatus";
    pub const SHUTDOWN: &str = "shutdown";
    pub const SYSTEM_STATUS: &str = "systemStatus";
}

/// Property names carried as `gsa:content` extensions.
pub mod properties {
    /// Present on every entry the appliance returns.
    pub const ENTRY_ID: &str = "entryID";

    pub const CRAWL_PAGES_PER_SECOND: &str = "crawlPagesPerSecond";
    pub const DO_NOT_CRAWL_URLS: &str = "doNotCrawlURLs";
    pub const FOLLOW_URLS: &str = "followURLs";
    pub const FOUND_URLS: &str = "foundURLs";
    pub const MAX_URLS: &str = "maxURLs";
    pub const PAUSE_CRAWL: &str = "pauseCrawl";
    pub const RESET_INDEX: &str = "resetIndex";
    pub const SERVED_URLS: &str = "servedURLs";
    pub const START_URLS: &str = "startURLs";
    pub const OVERALL_HEALTH: &str = "overallHealth";
    pub const QUERIES_PER_MINUTE: &str = "queriesPerMinute";

    pub const URL_PATTERN: &str = "urlPattern";
    pub const POLICY_ACL: &str = "acl";
}

/// Query parameter names.
pub mod queries {
    pub const QUERY: &str = "query";
    pub const MAX_LINES: &str = "maxLines";
    pub const START_LINE: &str = "startLine";
    pub const ACL_PATTERN_MATCH_MODE: &str = "matchMode";
}

/// Error codes the appliance puts in rejected responses.
pub mod errors {
    pub const VALIDATION: &str = "ValidationError";
    pub const ILLEGAL_PARAMETER: &str = "IllegalParameter";
    pub const MISSING_PARAMETER: &str = "MissingParameter";
    pub const INTERNAL: &str = "InternalError";
    pub const ENTRY_NOT_EXIST: &str = "EntryNotExist";
    pub const ENTRY_ALREADY_EXIST: &str = "EntryAlreadyExist";
    pub const LICENSE_LIMIT: &str = "LicenseLimit";
    pub const PERMISSION_DENIED: &str = "PermissionDenied";

    pub const ALL: &[&str] = &[
        VALIDATION,
        ILLEGAL_PARAMETER,
        MISSING_PARAMETER,
        INTERNAL,
        ENTRY_NOT_EXIST,
        ENTRY_ALREADY_EXIST,
        LICENSE_LIMIT,
        PERMISSION_DENIED,
    ];
}
