//! In-memory stand-ins for the datastore and push provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    notification::{NewNotification, Notification, NotificationRepository},
    push::{BatchResponse, PushError, PushMessage, PushProvider},
    state::AppState,
    token::{TokenRegistration, TokenRepository},
};

/// The error every failing in-memory repository returns.
pub fn datastore_error() -> AppError {
    AppError::Database(sqlx::Error::Protocol("connection reset by peer".to_string()))
}

#[derive(Default)]
pub struct InMemoryTokenRepository {
    rows: Mutex<HashMap<String, TokenRegistration>>,
    failing_reads: AtomicBool,
}

impl InMemoryTokenRepository {
    /// Makes every later lookup fail with [`datastore_error`].
    pub fn fail_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<()> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(datastore_error());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, user_id: &str) -> Option<TokenRegistration> {
        self.rows.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn upsert(
        &self,
        user_id: &str,
        fcm_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<TokenRegistration> {
        let registration = TokenRegistration {
            user_id: user_id.to_string(),
            fcm_token: fcm_token.to_string(),
            updated_at,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(user_id.to_string(), registration.clone());
        Ok(registration)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<TokenRegistration>> {
        self.check_reads()?;
        Ok(self.get(user_id))
    }

    async fn find_all(&self) -> Result<Vec<TokenRegistration>> {
        self.check_reads()?;
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    rows: Mutex<Vec<Notification>>,
    failing_inserts: AtomicBool,
}

impl InMemoryNotificationRepository {
    /// Makes every later insert fail with [`datastore_error`].
    pub fn fail_inserts(&self) {
        self.failing_inserts.store(true, Ordering::SeqCst);
    }

    fn check_inserts(&self) -> Result<()> {
        if self.failing_inserts.load(Ordering::SeqCst) {
            return Err(datastore_error());
        }
        Ok(())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }

    fn to_row(notification: &NewNotification) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: Value::Object(notification.data.clone()),
            sent_at: notification.sent_at,
            read_at: None,
            firebase_message_id: notification.firebase_message_id.clone(),
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        self.check_inserts()?;
        let row = Self::to_row(notification);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64> {
        self.check_inserts()?;
        let mut rows = self.rows.lock().unwrap();
        rows.extend(notifications.iter().map(Self::to_row));
        Ok(notifications.len() as u64)
    }

    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let mut found: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(found)
    }

    async fn mark_as_read(&self, id: Uuid, read_at: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut touched = 0;
        for row in rows.iter_mut().filter(|n| n.id == id) {
            row.read_at = Some(read_at);
            touched += 1;
        }
        Ok(touched)
    }
}

/// Records every message; tokens listed in `failing` are rejected.
#[derive(Default)]
pub struct FakePushProvider {
    failing: HashSet<String>,
    sent: Mutex<Vec<PushMessage>>,
    batch_calls: AtomicUsize,
}

impl FakePushProvider {
    pub fn failing_for(tokens: &[&str]) -> Self {
        Self {
            failing: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn deliver(&self, message: &PushMessage) -> std::result::Result<String, PushError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());

        if self.failing.contains(&message.token) {
            return Err(PushError::SendFailed(
                "The registration token is not a valid FCM registration token".to_string(),
            ));
        }

        Ok(format!("projects/test/messages/{}", sent.len()))
    }
}

#[async_trait]
impl PushProvider for FakePushProvider {
    async fn send(&self, message: &PushMessage) -> std::result::Result<String, PushError> {
        self.deliver(message)
    }

    async fn send_each(
        &self,
        messages: &[PushMessage],
    ) -> std::result::Result<BatchResponse, PushError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BatchResponse {
            responses: messages.iter().map(|m| self.deliver(m)).collect(),
        })
    }
}

pub struct TestApp {
    pub tokens: Arc<InMemoryTokenRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub push: Arc<FakePushProvider>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(push: FakePushProvider) -> Self {
        let tokens = Arc::new(InMemoryTokenRepository::default());
        let notifications = Arc::new(InMemoryNotificationRepository::default());
        let push = Arc::new(push);
        let state = AppState::new(tokens.clone(), notifications.clone(), push.clone());

        Self {
            tokens,
            notifications,
            push,
            state,
        }
    }
}
