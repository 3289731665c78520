// Error codes implementation
// Stable, operator-facing codes attached to every classified error

pub mod validation {
    pub const INVALID_AMOUNT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const INVALID_PERIOD: &str = "VALIDATION_1004";
}

pub mod remote {
    pub const REJECTED: &str = "REMOTE_2001";
    pub const NOT_FOUND: &str = "REMOTE_2002";
    pub const TIMEOUT: &str = "REMOTE_2003";
    pub const UNAVAILABLE: &str = "REMOTE_2004";
    pub const MALFORMED_RESPONSE: &str = "REMOTE_2005";
}

pub mod workflow {
    pub const INVALID_STATE: &str = "WORKFLOW_3001";
    pub const SUBMISSION_IN_FLIGHT: &str = "WORKFLOW_3002";
    pub const STALE_CONTEXT: &str = "WORKFLOW_3003";
    pub const NO_BILLABLE_ITEMS: &str = "WORKFLOW_3004";
    pub const DELETION_NOT_PERMITTED: &str = "WORKFLOW_3005";
    pub const CANCELLED: &str = "WORKFLOW_3006";
}

pub mod system {
    pub const CONFIGURATION: &str = "SYSTEM_4001";
    pub const LOGGING: &str = "SYSTEM_4002";
}
