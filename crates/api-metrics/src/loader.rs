use std::path::Path;

use crate::error::{MetricsError, MetricsResult};
use crate::message::SessionMessage;

/// Reads a session message log (a JSON array of messages) from disk.
pub fn load_messages(path: impl AsRef<Path>) -> MetricsResult<Vec<SessionMessage>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MetricsError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let messages = parse_messages(&content)?;
    log::debug!("loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

pub fn parse_messages(content: &str) -> MetricsResult<Vec<SessionMessage>> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_messages_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"ts":1,"type":"say","say":"api_req_started","text":"{{}}"}},{{"ts":2,"type":"ask","ask":"tool"}}]"#
        )
        .expect("write log");

        let messages = load_messages(file.path()).expect("load");

        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_api_request_started());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = load_messages(dir.path().join("ui_messages.json")).expect_err("missing");

        assert!(matches!(error, MetricsError::NotFound(_)));
    }

    #[test]
    fn malformed_log_is_an_error() {
        let error = parse_messages("{not a log").expect_err("malformed");
        assert!(matches!(error, MetricsError::Json(_)));
    }
}
