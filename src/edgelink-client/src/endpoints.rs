//! The device's numbered endpoint table. Paths are versionless and the
//! `iAction`/`iType` pairs are opaque; this module is the single place they
//! are spelled out.

pub const LOGIN: &str = "/POST/32";
pub const IP_SERVICES: &str = "/GET/9";
pub const SYSTEM_INFO: &str = "/GET/5";
pub const CLUSTER_STATUS: &str = "/GET/30";

// Virtual-service operations: allocate a blank template, fill it in, delete.
pub const VIP_TEMPLATE_CREATE: &str = "/POST/9?iAction=3&iType=1&FilterKeyword=";
pub const VIP_FILL: &str = "/POST/9?iAction=2&iType=1&FilterKeyword=";
pub const VIP_DELETE: &str = "/POST/9?iAction=3&iType=4&FilterKeyword=";

// Content-server operations, scoped by editedInterface/editedChannel.
pub const SERVER_ADD_INIT: &str = "/POST/9?iAction=3&iType=3&FilterKeyword=";
pub const SERVER_FILL: &str = "/POST/9?iAction=2&iType=2&FilterKeyword=";
pub const SERVER_DELETE: &str = "/POST/9?iAction=3&iType=5&FilterKeyword=";

pub const APPLY_CONFIG: &str = "/POST/5?iAction=1";
