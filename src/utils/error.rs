use thiserror::Error;

/// 失敗分類（封閉集合）：每一種對應一個固定的使用者訊息模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MalformedJson,
    UnrecognizedShape,
    NotFound,
    Timeout,
    ServerError,
    HttpError,
    NetworkUnreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 取得產品清單失敗的結果：永遠以資料形式回傳，不會越過邊界拋出
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn malformed_json(parser_message: &str, raw_body: &str) -> Self {
        // 只保留前 200 個字元，避免把整個壞掉的回應塞進訊息
        let preview: String = raw_body.chars().take(200).collect();
        Self {
            kind: FailureKind::MalformedJson,
            message: format!("{} | received: {}", parser_message, preview),
        }
    }

    pub fn unrecognized_object() -> Self {
        Self {
            kind: FailureKind::UnrecognizedShape,
            message: "object response had none of: data, products, items".to_string(),
        }
    }

    pub fn unrecognized_root() -> Self {
        Self {
            kind: FailureKind::UnrecognizedShape,
            message: "unexpected JSON root type".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            kind: FailureKind::NotFound,
            message: "no products available".to_string(),
        }
    }

    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: "request was cancelled due to timeout".to_string(),
        }
    }

    pub fn server_error(status: u16) -> Self {
        Self {
            kind: FailureKind::ServerError,
            message: format!("{}: server reported an internal error", status),
        }
    }

    pub fn http_error(status: u16) -> Self {
        Self {
            kind: FailureKind::HttpError,
            message: format!("unexpected status {}", status),
        }
    }

    pub fn network_unreachable(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::NetworkUnreachable,
            message: format!("unable to reach the server: {}", detail),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind {
            FailureKind::NotFound => ErrorSeverity::Low,
            FailureKind::Timeout | FailureKind::NetworkUnreachable => ErrorSeverity::Medium,
            FailureKind::MalformedJson
            | FailureKind::UnrecognizedShape
            | FailureKind::ServerError
            | FailureKind::HttpError => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind {
            FailureKind::MalformedJson => "Verify the API endpoint returns JSON",
            FailureKind::UnrecognizedShape => {
                "Verify the API endpoint returns a product list response"
            }
            FailureKind::NotFound => "The catalog is empty, try again later",
            FailureKind::Timeout => "Check your network connection and retry",
            FailureKind::ServerError => "Wait a moment and retry",
            FailureKind::HttpError => "Verify the API endpoint URL",
            FailureKind::NetworkUnreachable => "Check that the server is running and reachable",
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    FetchError(#[from] FetchFailure),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::FetchError(failure) => failure.severity(),
            _ => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::FetchError(failure) => failure.message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ClientError::FetchError(failure) => failure.recovery_suggestion(),
            ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::ConfigValidationError { .. } => {
                "Fix the configuration value and run again"
            }
            ClientError::IoError(_) => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
