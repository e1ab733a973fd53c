use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl BridgeError {
    /// True for failures caused by malformed input documents.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, BridgeError::Spreadsheet(_) | BridgeError::Xml(_))
    }
}

impl From<quick_xml::Error> for BridgeError {
    fn from(err: quick_xml::Error) -> Self {
        BridgeError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for BridgeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        BridgeError::Xml(format!("invalid attribute: {}", err))
    }
}

impl From<calamine::XlsxError> for BridgeError {
    fn from(err: calamine::XlsxError) -> Self {
        BridgeError::Spreadsheet(err.to_string())
    }
}
