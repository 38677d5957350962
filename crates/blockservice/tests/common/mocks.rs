use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use strata_core::{Block, Cid, Context};
use strata_exchange::{
    BlockStream, Exchange, ExchangeError, ExchangeResult, Fetcher, SessionExchange,
};
use strata_storage::{Blockstore, MemoryBackend, StorageError, StorageResult};
use tokio::time::Duration;

/// Memory-backed block store that counts every call made through the
/// [`Blockstore`] trait. Blocks seeded with [`InstrumentedStore::seed`] are
/// not counted.
#[allow(dead_code)]
#[derive(Default)]
pub struct InstrumentedStore {
    inner: MemoryBackend,
    has_calls: AtomicUsize,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
    put_many_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    batches: Mutex<Vec<Vec<Cid>>>,
    fail_reads: AtomicBool,
    get_delay: Option<Duration>,
}

#[allow(dead_code)]
impl InstrumentedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store whose `get` sleeps before answering.
    pub fn with_get_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            get_delay: Some(delay),
            ..Self::default()
        })
    }

    pub async fn seed(&self, blocks: &[Block]) {
        self.inner
            .put_many(&Context::background(), blocks)
            .await
            .unwrap();
    }

    /// Make every subsequent `has` and `get` fail with a backend error.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub async fn contains(&self, cid: &Cid) -> bool {
        self.inner.has(&Context::background(), cid).await.unwrap()
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    /// CIDs passed to each `put_many` call, in call order.
    pub fn batches(&self) -> Vec<Vec<Cid>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn put_many_calls(&self) -> usize {
        self.put_many_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn read_failure(&self) -> StorageResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk on fire".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Blockstore for InstrumentedStore {
    async fn has(&self, ctx: &Context, cid: &Cid) -> StorageResult<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.read_failure()?;
        self.inner.has(ctx, cid).await
    }

    async fn get(&self, ctx: &Context, cid: &Cid) -> StorageResult<Block> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        self.read_failure()?;
        self.inner.get(ctx, cid).await
    }

    async fn get_size(&self, ctx: &Context, cid: &Cid) -> StorageResult<usize> {
        self.inner.get_size(ctx, cid).await
    }

    async fn put(&self, ctx: &Context, block: &Block) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.put(ctx, block).await
    }

    async fn put_many(&self, ctx: &Context, blocks: &[Block]) -> StorageResult<()> {
        self.put_many_calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .unwrap()
            .push(blocks.iter().map(|b| *b.cid()).collect());
        self.inner.put_many(ctx, blocks).await
    }

    async fn delete_block(&self, ctx: &Context, cid: &Cid) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_block(ctx, cid).await
    }

    fn backend_name(&self) -> &'static str {
        "instrumented-memory"
    }
}

/// Blocks the simulated network can serve, plus counters shared by an
/// exchange and every session it creates.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockNetwork {
    blocks: Mutex<HashMap<Cid, Block>>,
    announced: Mutex<Vec<Cid>>,
    requested: Mutex<Vec<Vec<Cid>>>,
    get_block_calls: AtomicUsize,
    get_blocks_calls: AtomicUsize,
    has_block_calls: AtomicUsize,
    close_calls: AtomicUsize,
    sessions_created: AtomicUsize,
    session_requests: AtomicUsize,
}

#[allow(dead_code)]
impl MockNetwork {
    fn lookup(&self, cid: &Cid) -> ExchangeResult<Block> {
        self.blocks
            .lock()
            .unwrap()
            .get(cid)
            .cloned()
            .ok_or(ExchangeError::NotFound(*cid))
    }

    fn stream(&self, cids: Vec<Cid>, latency: Option<Duration>) -> BlockStream {
        self.requested.lock().unwrap().push(cids.clone());
        let found: Vec<Block> = cids.iter().filter_map(|c| self.lookup(c).ok()).collect();

        Box::pin(async_stream::stream! {
            for block in found {
                if let Some(latency) = latency {
                    tokio::time::sleep(latency).await;
                }
                yield block;
            }
        })
    }
}

/// Exchange over a [`MockNetwork`], optionally with session support.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockExchange {
    network: Arc<MockNetwork>,
    sessions: bool,
    fail_announce: bool,
    fail_get_blocks: bool,
    latency: Option<Duration>,
}

#[allow(dead_code)]
impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(mut self) -> Self {
        self.sessions = true;
        self
    }

    pub fn failing_announce(mut self) -> Self {
        self.fail_announce = true;
        self
    }

    pub fn failing_get_blocks(mut self) -> Self {
        self.fail_get_blocks = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn serving(self, blocks: &[Block]) -> Arc<Self> {
        {
            let mut held = self.network.blocks.lock().unwrap();
            for block in blocks {
                held.insert(*block.cid(), block.clone());
            }
        }
        Arc::new(self)
    }

    pub fn announced(&self) -> Vec<Cid> {
        self.network.announced.lock().unwrap().clone()
    }

    /// CIDs passed to each `get_blocks` call, exchange and sessions alike.
    pub fn requested(&self) -> Vec<Vec<Cid>> {
        self.network.requested.lock().unwrap().clone()
    }

    pub fn get_block_calls(&self) -> usize {
        self.network.get_block_calls.load(Ordering::SeqCst)
    }

    pub fn get_blocks_calls(&self) -> usize {
        self.network.get_blocks_calls.load(Ordering::SeqCst)
    }

    pub fn has_block_calls(&self) -> usize {
        self.network.has_block_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.network.close_calls.load(Ordering::SeqCst)
    }

    pub fn sessions_created(&self) -> usize {
        self.network.sessions_created.load(Ordering::SeqCst)
    }

    pub fn session_requests(&self) -> usize {
        self.network.session_requests.load(Ordering::SeqCst)
    }

    /// Any fetch through the exchange itself or one of its sessions.
    pub fn fetches(&self) -> usize {
        self.get_block_calls() + self.get_blocks_calls() + self.session_requests()
    }
}

#[async_trait]
impl Fetcher for MockExchange {
    async fn get_block(&self, _ctx: &Context, cid: &Cid) -> ExchangeResult<Block> {
        self.network.get_block_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.network.lookup(cid)
    }

    async fn get_blocks(&self, _ctx: &Context, cids: Vec<Cid>) -> ExchangeResult<BlockStream> {
        self.network.get_blocks_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get_blocks {
            return Err(ExchangeError::Network("no peers".into()));
        }
        Ok(self.network.stream(cids, self.latency))
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn has_block(&self, _ctx: &Context, block: &Block) -> ExchangeResult<()> {
        self.network.has_block_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_announce {
            return Err(ExchangeError::Network("announce rejected".into()));
        }
        self.network.announced.lock().unwrap().push(*block.cid());
        Ok(())
    }

    async fn close(&self) -> ExchangeResult<()> {
        self.network.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_session_exchange(self: Arc<Self>) -> Option<Arc<dyn SessionExchange>> {
        if self.sessions { Some(self) } else { None }
    }
}

impl SessionExchange for MockExchange {
    fn new_session(&self, _ctx: &Context) -> Arc<dyn Fetcher> {
        self.network.sessions_created.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockSession {
            network: self.network.clone(),
            latency: self.latency,
        })
    }
}

/// Fetcher handed out by [`MockExchange::new_session`].
struct MockSession {
    network: Arc<MockNetwork>,
    latency: Option<Duration>,
}

#[async_trait]
impl Fetcher for MockSession {
    async fn get_block(&self, _ctx: &Context, cid: &Cid) -> ExchangeResult<Block> {
        self.network.session_requests.fetch_add(1, Ordering::SeqCst);
        self.network.lookup(cid)
    }

    async fn get_blocks(&self, _ctx: &Context, cids: Vec<Cid>) -> ExchangeResult<BlockStream> {
        self.network.session_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.network.stream(cids, self.latency))
    }
}
