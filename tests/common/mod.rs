//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::dyn_abi::DynSolValue;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contract_dispatch::blockchain::{
    BlockchainError, BlockchainResult, LegacyRpc, RpcConnector, StandardRpc, TxReceipt,
};
use contract_dispatch::config::{ContractConfig, InteractionConfig, TransactionConfig};
use contract_dispatch::nonce::NonceManager;
use contract_dispatch::provider::{ContractRole, ProviderFactory};
use contract_dispatch::SigningIdentity;

// Well-known test private key (Anvil's first account)
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const CHAIN_ID: u64 = 1337;

pub const CONSENT_ABI: &str = r#"[
    {"type":"function","name":"giveConsent","stateMutability":"nonpayable",
     "inputs":[{"name":"consentId","type":"string"},{"name":"ownerId","type":"string"},{"name":"consumerId","type":"string"}],
     "outputs":[]},
    {"type":"function","name":"revokeConsent","stateMutability":"nonpayable",
     "inputs":[{"name":"consentId","type":"string"}],"outputs":[]},
    {"type":"function","name":"hasConsent","stateMutability":"view",
     "inputs":[{"name":"consentId","type":"string"},{"name":"consumerId","type":"string"}],
     "outputs":[{"name":"","type":"bool"}]}
]"#;

pub const ACCESS_ABI: &str = r#"[
    {"type":"function","name":"grantAccess","stateMutability":"nonpayable",
     "inputs":[{"name":"resourceId","type":"string"},{"name":"granteeId","type":"string"}],"outputs":[]},
    {"type":"function","name":"revokeAccess","stateMutability":"nonpayable",
     "inputs":[{"name":"resourceId","type":"string"},{"name":"granteeId","type":"string"}],"outputs":[]},
    {"type":"function","name":"checkAccess","stateMutability":"view",
     "inputs":[{"name":"resourceId","type":"string"},{"name":"granteeId","type":"string"}],
     "outputs":[{"name":"","type":"bool"}]}
]"#;

pub const FILE_ABI: &str = r#"[
    {"type":"function","name":"saveFile","stateMutability":"nonpayable",
     "inputs":[{"name":"fileId","type":"string"},{"name":"contentHash","type":"string"},{"name":"ownerId","type":"string"}],
     "outputs":[]},
    {"type":"function","name":"shareFile","stateMutability":"nonpayable",
     "inputs":[{"name":"fileId","type":"string"},{"name":"recipientId","type":"string"}],"outputs":[]},
    {"type":"function","name":"getFile","stateMutability":"view",
     "inputs":[{"name":"fileId","type":"string"}],"outputs":[{"name":"","type":"string"}]}
]"#;

pub fn consent_address() -> Address {
    Address::repeat_byte(0xc1)
}

pub fn identity() -> SigningIdentity {
    SigningIdentity::new(TEST_ADDRESS, TEST_PRIVATE_KEY)
}

pub fn signer() -> Address {
    TEST_ADDRESS.parse().unwrap()
}

/// All three contracts, chain id left for the chain to report.
pub fn interaction_config() -> InteractionConfig {
    InteractionConfig::new("http://mock.invalid")
        .with_contract(
            ContractRole::Consent,
            ContractConfig::from_json(consent_address(), CONSENT_ABI).unwrap(),
        )
        .with_contract(
            ContractRole::Access,
            ContractConfig::from_json(Address::repeat_byte(0xa1), ACCESS_ABI).unwrap(),
        )
        .with_contract(
            ContractRole::FileManagement,
            ContractConfig::from_json(Address::repeat_byte(0xf1), FILE_ABI).unwrap(),
        )
}

/// Short receipt deadlines so timeouts stay fast.
pub fn transaction_config() -> TransactionConfig {
    TransactionConfig {
        receipt_timeout_secs: 2,
        receipt_poll_interval_ms: 10,
        receipt_poll_max_interval_ms: 40,
        ..TransactionConfig::default()
    }
}

pub fn factory(chain: &Arc<MockChain>) -> ProviderFactory {
    factory_with_nonces(chain, Arc::new(NonceManager::in_memory()))
}

pub fn factory_with_nonces(chain: &Arc<MockChain>, nonces: Arc<NonceManager>) -> ProviderFactory {
    ProviderFactory::new(
        interaction_config(),
        Arc::new(MockConnector(Arc::clone(chain))),
        transaction_config(),
        nonces,
    )
}

/// ABI-encode a single return value the way a contract would.
pub fn returns(value: DynSolValue) -> Bytes {
    Bytes::from(DynSolValue::Tuple(vec![value]).abi_encode_params())
}

/// In-memory chain serving both RPC surfaces.
///
/// Every round trip increments `rpc_calls`. Mined transactions bump the
/// pending count like a real node would.
pub struct MockChain {
    rpc_calls: AtomicUsize,
    pending_count: AtomicU64,
    fail_broadcast: AtomicBool,
    never_mine: AtomicBool,
    revert: AtomicBool,
    call_result: Mutex<Bytes>,
    last_call_from: Mutex<Option<Address>>,
    mined: Mutex<Vec<TxEnvelope>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rpc_calls: AtomicUsize::new(0),
            pending_count: AtomicU64::new(0),
            fail_broadcast: AtomicBool::new(false),
            never_mine: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            call_result: Mutex::new(Bytes::new()),
            last_call_from: Mutex::new(None),
            mined: Mutex::new(Vec::new()),
        })
    }

    pub fn rpc_calls(&self) -> usize {
        self.rpc_calls.load(Ordering::SeqCst)
    }

    pub fn set_pending_count(&self, count: u64) {
        self.pending_count.store(count, Ordering::SeqCst);
    }

    pub fn set_fail_broadcast(&self, fail: bool) {
        self.fail_broadcast.store(fail, Ordering::SeqCst);
    }

    pub fn set_never_mine(&self, never: bool) {
        self.never_mine.store(never, Ordering::SeqCst);
    }

    pub fn set_revert(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    pub fn set_call_result(&self, data: Bytes) {
        *self.call_result.lock().unwrap() = data;
    }

    pub fn last_call_from(&self) -> Option<Address> {
        *self.last_call_from.lock().unwrap()
    }

    /// Nonces of mined transactions, in mining order.
    pub fn mined_nonces(&self) -> Vec<u64> {
        self.mined.lock().unwrap().iter().map(|tx| tx.nonce()).collect()
    }

    pub fn mined(&self) -> Vec<TxEnvelope> {
        self.mined.lock().unwrap().clone()
    }

    fn tick(&self) {
        self.rpc_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn decode(raw: &Bytes) -> BlockchainResult<TxEnvelope> {
        TxEnvelope::decode_2718(&mut &raw[..]).map_err(|e| BlockchainError::Rpc(format!("bad raw tx: {e}")))
    }

    fn accept(&self, raw: &Bytes) -> BlockchainResult<TxHash> {
        if self.fail_broadcast.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("replacement transaction underpriced".to_string()));
        }
        let tx = Self::decode(raw)?;
        Ok(*tx.tx_hash())
    }

    fn mine(&self, raw: &Bytes) -> BlockchainResult<TxReceipt> {
        let tx = Self::decode(raw)?;
        let hash = *tx.tx_hash();
        let mut mined = self.mined.lock().unwrap();
        mined.push(tx);
        self.pending_count.fetch_add(1, Ordering::SeqCst);
        Ok(TxReceipt {
            transaction_hash: hash,
            block_number: Some(mined.len() as u64),
            gas_used: 42_000,
            status: !self.revert.load(Ordering::SeqCst),
        })
    }

    fn call_from(&self, from: Option<Address>) -> Bytes {
        *self.last_call_from.lock().unwrap() = from;
        self.call_result.lock().unwrap().clone()
    }
}

#[async_trait]
impl StandardRpc for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.tick();
        Ok(CHAIN_ID)
    }

    async fn call(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        self.tick();
        Ok(self.call_from(tx.from))
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> BlockchainResult<u64> {
        self.tick();
        Ok(50_000)
    }

    async fn pending_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        self.tick();
        Ok(self.pending_count.load(Ordering::SeqCst))
    }

    async fn submit_raw_transaction(&self, raw: Bytes, receipt_timeout: Duration) -> BlockchainResult<TxReceipt> {
        self.tick();
        let tx_hash = self.accept(&raw)?;
        tokio::task::yield_now().await;
        if self.never_mine.load(Ordering::SeqCst) {
            return Err(BlockchainError::ReceiptTimeout {
                tx_hash,
                secs: receipt_timeout.as_secs(),
            });
        }
        self.mine(&raw)
    }
}

#[async_trait]
impl LegacyRpc for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.tick();
        Ok(CHAIN_ID)
    }

    async fn call(&self, from: Address, _to: Address, _data: Bytes) -> BlockchainResult<Bytes> {
        self.tick();
        Ok(self.call_from(Some(from)))
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        self.tick();
        Ok(self.pending_count.load(Ordering::SeqCst))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        self.tick();
        let tx_hash = self.accept(&raw)?;
        if !self.never_mine.load(Ordering::SeqCst) {
            self.mine(&raw)?;
        }
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>> {
        self.tick();
        let mined = self.mined.lock().unwrap();
        Ok(mined.iter().position(|tx| *tx.tx_hash() == tx_hash).map(|idx| TxReceipt {
            transaction_hash: tx_hash,
            block_number: Some(idx as u64 + 1),
            gas_used: 42_000,
            status: !self.revert.load(Ordering::SeqCst),
        }))
    }
}

/// Hands the same mock chain to every adapter.
pub struct MockConnector(pub Arc<MockChain>);

impl RpcConnector for MockConnector {
    fn standard(&self, _config: &InteractionConfig) -> BlockchainResult<Arc<dyn StandardRpc>> {
        Ok(self.0.clone())
    }

    fn legacy(&self, _config: &InteractionConfig) -> BlockchainResult<Arc<dyn LegacyRpc>> {
        Ok(self.0.clone())
    }
}
