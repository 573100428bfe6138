#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use tingg_core::adapters::{InMemoryJobQueue, InMemoryProviderDirectory, InMemoryTransactionRepository};
use tingg_core::config::SenderOfRecord;
use tingg_core::domain::upstream::{
    HostModels, HostResult, Money, ProcessingItem, UpstreamMobileMoneyProvider, UpstreamRecipient,
    UpstreamSender, UpstreamTransaction, UpstreamTransactionState, UpstreamTransactionType,
};
use tingg_core::domain::{
    Job, NewTransaction, ProcessingItemState, ProviderDirectoryEntry, QueuedJob, TransactionRecord,
    TransactionState,
};
use tingg_core::gateway::{GatewayError, GatewayResponse, PaymentResult};
use tingg_core::ports::{GatewayClient, JobQueue, ProviderDirectory, RepositoryError, RepositoryResult};
use tingg_core::services::JobRunner;

pub const PROVIDER_CODE: &str = "MTN";
pub const COUNTRY_CODE: &str = "NGA";
pub const SERVICE_CODE: &str = "MTNNG";

pub fn sender_of_record() -> SenderOfRecord {
    SenderOfRecord {
        name: "Remit Ltd".to_string(),
        phone_number: "+2348000000000".to_string(),
    }
}

pub struct FakeSender {
    pub id: Uuid,
}

impl UpstreamSender for FakeSender {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct FakeRecipient {
    pub id: Uuid,
    pub mobile_provider: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: String,
}

impl UpstreamRecipient for FakeRecipient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn mobile_provider(&self) -> Option<String> {
        self.mobile_provider.clone()
    }

    fn phone_number(&self) -> Option<String> {
        self.phone_number.clone()
    }

    fn country_code(&self) -> String {
        self.country_code.clone()
    }
}

pub struct FakeTransaction {
    pub id: Uuid,
    pub kind: UpstreamTransactionType,
    pub state: UpstreamTransactionState,
    pub output_amount: Money,
    pub reference: String,
    pub sender: Option<Arc<FakeSender>>,
    pub recipient: Option<Arc<FakeRecipient>>,
}

impl FakeTransaction {
    /// An upstream transaction that passes every eligibility check.
    pub fn eligible() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            kind: UpstreamTransactionType::Mobile,
            state: UpstreamTransactionState::Processing,
            output_amount: Money::new("NGN", BigDecimal::from_str("2.01").unwrap()),
            reference: format!("TX-{}", &id.simple().to_string()[..8]),
            sender: Some(Arc::new(FakeSender { id: Uuid::new_v4() })),
            recipient: Some(Arc::new(FakeRecipient {
                id: Uuid::new_v4(),
                mobile_provider: Some(PROVIDER_CODE.to_string()),
                phone_number: Some("+2348011111111".to_string()),
                country_code: COUNTRY_CODE.to_string(),
            })),
        }
    }
}

#[async_trait]
impl UpstreamTransaction for FakeTransaction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn kind(&self) -> UpstreamTransactionType {
        self.kind
    }

    fn state(&self) -> UpstreamTransactionState {
        self.state
    }

    fn output_amount(&self) -> Money {
        self.output_amount.clone()
    }

    fn reference_for_humans(&self) -> String {
        self.reference.clone()
    }

    async fn sender(&self) -> HostResult<Option<Arc<dyn UpstreamSender>>> {
        Ok(self.sender.clone().map(|s| s as Arc<dyn UpstreamSender>))
    }

    async fn recipient(&self) -> HostResult<Option<Arc<dyn UpstreamRecipient>>> {
        Ok(self.recipient.clone().map(|r| r as Arc<dyn UpstreamRecipient>))
    }
}

pub struct FakeProcessingItem {
    pub id: Uuid,
    pub transaction: Option<Arc<FakeTransaction>>,
    pub updates: Mutex<Vec<(ProcessingItemState, String)>>,
}

impl FakeProcessingItem {
    pub fn new(transaction: Option<FakeTransaction>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction: transaction.map(Arc::new),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn last_update(&self) -> Option<(ProcessingItemState, String)> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessingItem for FakeProcessingItem {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn transaction(&self) -> HostResult<Option<Arc<dyn UpstreamTransaction>>> {
        Ok(self
            .transaction
            .clone()
            .map(|t| t as Arc<dyn UpstreamTransaction>))
    }

    async fn update_state_code(&self, state: ProcessingItemState, reason: &str) -> HostResult<()> {
        self.updates.lock().unwrap().push((state, reason.to_string()));
        Ok(())
    }
}

pub struct FakeProvider {
    pub id: Uuid,
}

impl UpstreamMobileMoneyProvider for FakeProvider {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Default)]
pub struct FakeHost {
    items: Mutex<HashMap<Uuid, Arc<FakeProcessingItem>>>,
    providers: Mutex<Vec<(String, String, Arc<FakeProvider>)>>,
}

impl FakeHost {
    pub fn add_item(&self, item: FakeProcessingItem) -> Arc<FakeProcessingItem> {
        let item = Arc::new(item);
        self.items.lock().unwrap().insert(item.id, item.clone());
        item
    }

    pub fn add_provider(&self, code: &str, country_code: &str) -> Uuid {
        let provider = Arc::new(FakeProvider { id: Uuid::new_v4() });
        let id = provider.id;
        self.providers
            .lock()
            .unwrap()
            .push((code.to_string(), country_code.to_string(), provider));
        id
    }
}

#[async_trait]
impl HostModels for FakeHost {
    async fn find_processing_item(&self, id: Uuid) -> HostResult<Option<Arc<dyn ProcessingItem>>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .map(|i| i as Arc<dyn ProcessingItem>))
    }

    async fn find_mobile_money_provider(
        &self,
        code: &str,
        country_code: &str,
    ) -> HostResult<Option<Arc<dyn UpstreamMobileMoneyProvider>>> {
        Ok(self
            .providers
            .lock()
            .unwrap()
            .iter()
            .find(|(c, country, _)| c == code && country == country_code)
            .map(|(_, _, p)| p.clone() as Arc<dyn UpstreamMobileMoneyProvider>))
    }
}

/// Scripted gateway answers, consumed in order.
pub enum Scripted {
    Respond(GatewayResponse),
    Fail(String),
}

#[derive(Default)]
pub struct FakeGateway {
    script: Mutex<VecDeque<Scripted>>,
    pub submit_calls: Mutex<usize>,
    pub query_calls: Mutex<usize>,
}

impl FakeGateway {
    pub fn push(&self, answer: Scripted) {
        self.script.lock().unwrap().push_back(answer);
    }

    pub fn respond(&self, response: GatewayResponse) {
        self.push(Scripted::Respond(response));
    }

    pub fn calls(&self) -> usize {
        *self.submit_calls.lock().unwrap() + *self.query_calls.lock().unwrap()
    }

    fn next(&self) -> Result<GatewayResponse, GatewayError> {
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(GatewayError::Status {
                status: 503,
                body: message,
            }),
            None => Err(GatewayError::InvalidResponse("no scripted answer".to_string())),
        }
    }
}

#[async_trait]
impl GatewayClient for FakeGateway {
    async fn submit_payment(&self, _record: &TransactionRecord) -> Result<GatewayResponse, GatewayError> {
        *self.submit_calls.lock().unwrap() += 1;
        self.next()
    }

    async fn query_status(&self, _record: &TransactionRecord) -> Result<GatewayResponse, GatewayError> {
        *self.query_calls.lock().unwrap() += 1;
        self.next()
    }
}

pub fn gateway_response(auth: Option<&str>, status: Option<&str>, reference: Option<&str>) -> GatewayResponse {
    GatewayResponse {
        auth_status_code: auth.map(str::to_string),
        auth_status_description: auth.map(|_| "Authentication was successful".to_string()),
        results: status
            .map(|code| {
                vec![PaymentResult {
                    status_code: Some(code.to_string()),
                    status_description: Some(format!("status {code}")),
                    remote_reference: reference.map(str::to_string),
                }]
            })
            .unwrap_or_default(),
        raw_body: r#"{"authStatus":{},"results":[]}"#.to_string(),
    }
}

/// Queue whose backing store is down.
pub struct UnavailableQueue;

impl UnavailableQueue {
    fn down<T>() -> RepositoryResult<T> {
        Err(RepositoryError::Corrupt("queue down".to_string()))
    }
}

#[async_trait]
impl JobQueue for UnavailableQueue {
    async fn dispatch(&self, _job: Job) -> RepositoryResult<bool> {
        Self::down()
    }

    async fn claim_next(&self) -> RepositoryResult<Option<QueuedJob>> {
        Self::down()
    }

    async fn complete(&self, _id: Uuid) -> RepositoryResult<()> {
        Self::down()
    }

    async fn fail(&self, _id: Uuid, _error: &str) -> RepositoryResult<()> {
        Self::down()
    }

    async fn release_expired(&self) -> RepositoryResult<u64> {
        Self::down()
    }
}

/// In-memory wiring of every collaborator the operations need.
pub struct Harness {
    pub transactions: Arc<InMemoryTransactionRepository>,
    pub providers: Arc<InMemoryProviderDirectory>,
    pub queue: Arc<InMemoryJobQueue>,
    pub gateway: Arc<FakeGateway>,
    pub host: Arc<FakeHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(InMemoryTransactionRepository::new()),
            providers: Arc::new(InMemoryProviderDirectory::new()),
            queue: Arc::new(InMemoryJobQueue::new()),
            gateway: Arc::new(FakeGateway::default()),
            host: Arc::new(FakeHost::default()),
        }
    }

    /// Registers the default recipient provider on both the host and the directory.
    pub async fn with_provider(self) -> Self {
        let source_id = self.host.add_provider(PROVIDER_CODE, COUNTRY_CODE);
        self.providers
            .insert(ProviderDirectoryEntry::new(source_id, SERVICE_CODE))
            .await
            .unwrap();
        self
    }

    pub fn runner(&self) -> JobRunner {
        self.runner_with_queue(self.queue.clone())
    }

    pub fn runner_with_queue(&self, queue: Arc<dyn JobQueue>) -> JobRunner {
        JobRunner::new(
            self.transactions.clone(),
            self.providers.clone(),
            queue,
            self.gateway.clone(),
            self.host.clone(),
            sender_of_record(),
        )
    }

    /// Stores a record in `state` linked to a fresh processing item.
    pub async fn seed_record(
        &self,
        state: TransactionState,
        remote_reference: Option<&str>,
    ) -> (TransactionRecord, Arc<FakeProcessingItem>) {
        let item = self.host.add_item(FakeProcessingItem::new(None));
        let mut record = new_transaction(item.id).into_record(Utc::now());
        record.state = state;
        record.remote_reference = remote_reference.map(str::to_string);
        self.transactions.seed(record.clone()).await;
        (record, item)
    }
}

pub fn new_transaction(processing_item_id: Uuid) -> NewTransaction {
    let id = Uuid::new_v4();
    NewTransaction {
        id,
        upstream_transaction_id: Uuid::new_v4(),
        processing_item_id,
        reference: format!("TX-{}", id.simple()),
        country_code: COUNTRY_CODE.to_string(),
        currency_code: "NGN".to_string(),
        amount: BigDecimal::from_str("2.01").unwrap(),
        service_code: SERVICE_CODE.to_string(),
        product_code: None,
        sender_name: "Remit Ltd".to_string(),
        sender_phone_number: "+2348000000000".to_string(),
        recipient_phone_number: "+2348011111111".to_string(),
    }
}
