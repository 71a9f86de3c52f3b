//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap RPC round trips with a deadline
//! - Turn an expired deadline into `BlockchainError::Timeout`
//! - Keep node error responses typed and separate from transport failures

use alloy::transports::TransportResult;
use std::future::IntoFuture;
use std::time::Duration;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::observability::metrics;

/// Await `fut` for at most `limit`.
///
/// A JSON-RPC error response is kept as `BlockchainError::Node`; other
/// transport failures become `BlockchainError::Rpc`. An expired deadline
/// becomes `BlockchainError::Timeout` labelled with `operation`.
pub async fn with_timeout<F, T>(operation: &'static str, limit: Duration, fut: F) -> BlockchainResult<T>
where
    F: IntoFuture<Output = TransportResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.is_error_resp() => Err(BlockchainError::Node { operation, source: e }),
        Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{operation} failed: {e}"))),
        Err(_) => {
            metrics::record_rpc_timeout(operation);
            Err(BlockchainError::Timeout {
                operation,
                secs: limit.as_secs(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::{ErrorPayload, RpcError};
    use alloy::transports::{TransportError, TransportErrorKind};

    #[tokio::test]
    async fn test_passes_value_through() {
        let result = with_timeout("noop", Duration::from_secs(1), async { Ok::<_, TransportError>(7u64) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_maps_transport_error() {
        let result: BlockchainResult<u64> = with_timeout("eth_call", Duration::from_secs(1), async {
            Err(TransportErrorKind::custom_str("connection reset"))
        })
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, BlockchainError::Rpc(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_keeps_error_response_typed() {
        let reverted: TransportError = RpcError::err_resp(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });
        let result: BlockchainResult<u64> =
            with_timeout("eth_call", Duration::from_secs(1), async { Err(reverted) }).await;
        match result {
            Err(BlockchainError::Node { operation, source }) => {
                assert_eq!(operation, "eth_call");
                assert_eq!(source.as_error_resp().map(|e| e.code), Some(3));
            }
            other => panic!("expected node error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry() {
        let result: BlockchainResult<u64> =
            with_timeout("eth_getTransactionCount", Duration::from_secs(3), async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, TransportError>(1)
            })
            .await;
        match result {
            Err(BlockchainError::Timeout { operation, secs }) => {
                assert_eq!(operation, "eth_getTransactionCount");
                assert_eq!(secs, 3);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
