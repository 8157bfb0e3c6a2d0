use std::path::PathBuf;

/// Server identity and endpoint layout shared by both transports.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    pub protocol_version: String,
    /// Page size for list tools and list actions
    pub page_size: usize,
    pub mcp_path: String,
    pub rest_prefix: String,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "crud-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "MCP tools generated from registered CRUD ViewSets".to_string(),
            protocol_version: "2024-11-05".to_string(),
            page_size: 20,
            mcp_path: "/mcp/".to_string(),
            rest_prefix: "/api/".to_string(),
            db_path: PathBuf::from(".crud-mcp.db"),
        }
    }
}

impl ServerConfig {
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }
}
