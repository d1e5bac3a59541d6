//! Shared fixtures: a recording platform double and an engine harness.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gavel::config::{CommunityConfig, ConfigRegistry};
use gavel::event::Event;
use gavel::orchestrator::AutomodEngine;
use gavel::platform::{ActionExecutor, ModLogEntry, Notifier, SanctionNotice};
use gavel::store::MemoryCaseStore;
use gavel::{ChannelId, CommunityId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGING: Once = Once::new();

fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// One platform call observed by the recording executor.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum ExecutedAction {
    Timeout {
        community: CommunityId,
        user: UserId,
        duration_secs: u64,
    },
    Ban {
        community: CommunityId,
        user: UserId,
    },
    Kick {
        community: CommunityId,
        user: UserId,
    },
    DeleteMessage {
        message_id: String,
    },
}

/// ActionExecutor double that records calls and can be told to fail.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<ExecutedAction>>,
    pub fail: AtomicBool,
}

impl RecordingExecutor {
    fn record(&self, action: ExecutedAction) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("platform rejected the request");
        }
        self.calls.lock().unwrap().push(action);
        Ok(())
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<ExecutedAction> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn timeout(
        &self,
        community: CommunityId,
        user: UserId,
        duration_secs: u64,
        _reason: &str,
    ) -> anyhow::Result<()> {
        self.record(ExecutedAction::Timeout {
            community,
            user,
            duration_secs,
        })
    }

    async fn ban(&self, community: CommunityId, user: UserId, _reason: &str) -> anyhow::Result<()> {
        self.record(ExecutedAction::Ban { community, user })
    }

    async fn kick(
        &self,
        community: CommunityId,
        user: UserId,
        _reason: &str,
    ) -> anyhow::Result<()> {
        self.record(ExecutedAction::Kick { community, user })
    }

    async fn delete_message(&self, event: &Event) -> anyhow::Result<()> {
        self.record(ExecutedAction::DeleteMessage {
            message_id: event.message_id.clone(),
        })
    }
}

/// Notifier double recording DMs and mod-log entries.
#[derive(Default)]
pub struct RecordingNotifier {
    pub dms: Mutex<Vec<(UserId, SanctionNotice)>>,
    pub log_entries: Mutex<Vec<(CommunityId, ModLogEntry)>>,
    pub fail_dm: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn direct_message(&self, user: UserId, notice: &SanctionNotice) -> anyhow::Result<()> {
        if self.fail_dm.load(Ordering::SeqCst) {
            anyhow::bail!("user has DMs closed");
        }
        self.dms.lock().unwrap().push((user, notice.clone()));
        Ok(())
    }

    async fn mod_log(&self, community: CommunityId, entry: &ModLogEntry) -> anyhow::Result<()> {
        self.log_entries
            .lock()
            .unwrap()
            .push((community, entry.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub engine: AutomodEngine,
    pub executor: Arc<RecordingExecutor>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryCaseStore>,
    pub configs: Arc<ConfigRegistry>,
}

/// Engine wired to in-memory storage and recording platform doubles.
pub fn harness() -> Harness {
    init_logging();

    let configs = Arc::new(ConfigRegistry::new());
    let store = Arc::new(MemoryCaseStore::new());
    let executor = Arc::new(RecordingExecutor::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = AutomodEngine::new(
        configs.clone(),
        store.clone(),
        executor.clone(),
        notifier.clone(),
    );

    Harness {
        engine,
        executor,
        notifier,
        store,
        configs,
    }
}

/// Harness with a deny-list installed for the given community.
#[allow(dead_code)]
pub fn harness_with_deny_list(community: CommunityId, words: &[&str]) -> Harness {
    let h = harness();
    h.configs.set_community(
        community,
        CommunityConfig {
            deny_list: words.iter().map(|w| w.to_string()).collect(),
            ..Default::default()
        },
    );
    h
}

/// Build an event with an explicit timestamp so burst-window behavior is
/// deterministic.
#[allow(dead_code)]
pub fn event_at(
    message_id: &str,
    author: UserId,
    community: CommunityId,
    channel: ChannelId,
    content: &str,
    at: DateTime<Utc>,
) -> Event {
    Event {
        message_id: message_id.to_string(),
        author_id: author,
        author_is_bot: false,
        community_id: community,
        channel_id: channel,
        content: content.to_string(),
        timestamp: at,
    }
}
