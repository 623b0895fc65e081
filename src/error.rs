/// Broad category of a fatal run error.
///
/// Row-level coercion problems are never reported through this type; they are
/// collected as `RowIssue`s and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required columns are missing from the input header.
    Schema,
    /// Bad user input (paths, arguments, report files).
    Input,
    /// Filesystem read/write failure.
    Io,
    /// Terminal setup, drawing or event handling failed.
    Terminal,
}

impl ErrorKind {
    fn default_exit_code(self) -> u8 {
        match self {
            ErrorKind::Schema | ErrorKind::Input | ErrorKind::Io => 2,
            ErrorKind::Terminal => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.default_exit_code(),
            message: message.into(),
        }
    }

    /// Missing-column error listing every absent column at once.
    pub fn missing_columns(missing: &[&str]) -> Self {
        let list = missing
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorKind::Schema,
            format!("The file does not have the expected columns. Missing: {list}"),
        )
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_column() {
        let err = AppError::missing_columns(&["Mes", "Costo_total"]);
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`Mes`"));
        assert!(err.message().contains("`Costo_total`"));
    }

    #[test]
    fn terminal_errors_use_runtime_exit_code() {
        assert_eq!(AppError::terminal("boom").exit_code(), 4);
    }
}
