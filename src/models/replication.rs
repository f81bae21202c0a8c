use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Credentials for the MySQL server whose replication settings are checked.
#[derive(Clone, Deserialize)]
pub struct ConnectionCredential {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

/// Accepts `3307` as well as `"3307"`.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port: {:?}", text))),
    }
}

impl fmt::Debug for ConnectionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCredential")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"********")
            .field("dbname", &self.dbname)
            .field("port", &self.port)
            .finish()
    }
}

/// Verdict of a replication check. `success` is true only if every check passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationStatus {
    pub success: bool,
    pub message: String,
}

impl ReplicationStatus {
    pub fn ready(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
