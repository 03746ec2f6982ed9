use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Network error: {0}")]
    NetworkMessage(String),
    #[error("Protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("Static GTFS error: {0}")]
    Static(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_network_message() {
        let err = FeedError::NetworkMessage("HTTP 503".into());
        assert_eq!(err.to_string(), "Network error: HTTP 503");
    }

    #[test]
    fn error_display_static() {
        let err = FeedError::Static("stops.txt missing stop_id".into());
        assert_eq!(err.to_string(), "Static GTFS error: stops.txt missing stop_id");
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FeedError = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(matches!(err, FeedError::Io(_)));
    }

    #[test]
    fn error_from_prost_decode_error() {
        let bad_bytes: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let result = <gtfs_realtime::FeedMessage as prost::Message>::decode(bad_bytes);
        let decode_err = result.unwrap_err();
        let err: FeedError = decode_err.into();
        assert!(matches!(err, FeedError::Protobuf(_)));
    }
}
