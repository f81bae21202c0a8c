use thiserror::Error;

use crate::models::ReplicationStatus;

/// Server variables read by the binlog check, in query order.
pub const LOG_BIN: &str = "log_bin";
pub const BINLOG_FORMAT: &str = "binlog_format";
pub const BINLOG_ROW_IMAGE: &str = "binlog_row_image";
pub const SERVER_ID: &str = "server_id";

/// One consistent snapshot of the binlog settings, fetched on a single session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinlogVariables {
    pub log_bin: String,
    pub binlog_format: String,
    pub binlog_row_image: String,
    pub server_id: String,
}

/// A binlog setting that rules out row-based change capture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinlogViolation {
    #[error("Binary log is {0}")]
    LogBinDisabled(String),

    #[error("Invalid binlog_format={0}, must be ROW")]
    Format(String),

    #[error("Invalid binlog_row_image={0}, must be FULL")]
    RowImage(String),

    #[error("server_id must be non-zero for replication")]
    ZeroServerId,
}

impl BinlogVariables {
    /// Every failing check, in check order.
    pub fn violations(&self) -> Vec<BinlogViolation> {
        let mut out = Vec::new();

        if !self.log_bin.eq_ignore_ascii_case("on") {
            out.push(BinlogViolation::LogBinDisabled(self.log_bin.clone()));
        }
        if !self.binlog_format.eq_ignore_ascii_case("ROW") {
            out.push(BinlogViolation::Format(self.binlog_format.clone()));
        }
        if !self.binlog_row_image.eq_ignore_ascii_case("FULL") {
            out.push(BinlogViolation::RowImage(self.binlog_row_image.clone()));
        }
        if self.server_id == "0" {
            out.push(BinlogViolation::ZeroServerId);
        }

        out
    }

    /// Readiness verdict. Only the first violation is reported.
    pub fn status(&self) -> ReplicationStatus {
        match self.violations().into_iter().next() {
            Some(violation) => ReplicationStatus::failed(violation.to_string()),
            None => ReplicationStatus::ready(format!(
                "Binlog enabled with format={}, row_image={}, server_id={}",
                self.binlog_format, self.binlog_row_image, self.server_id
            )),
        }
    }
}
