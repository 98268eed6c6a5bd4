//! Shared fixtures for the service unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use rollcall_database::MemoryStore;
use rollcall_entity::class::Class;
use rollcall_entity::notification::Notification;
use rollcall_entity::user::{User, UserRole};

use crate::attendance::{AttendanceSessionMachine, CheckInProcessor};
use crate::biometric::{BiometricGateway, FaceMatch, GatewayError};
use crate::notification::{ChannelNotifier, NotificationFanOut};
use crate::report::ReportService;

/// Gateway that answers every call with the same confidence after `delay`.
pub struct FixedGateway {
    pub confidence: f64,
    pub delay: Duration,
}

#[async_trait]
impl BiometricGateway for FixedGateway {
    async fn verify_face(&self, _: &str, _: Uuid) -> Result<FaceMatch, GatewayError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(FaceMatch {
            matched: self.confidence >= 0.5,
            confidence: self.confidence,
            face_id: None,
        })
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub lecturer: User,
    pub class: Class,
    pub students: Vec<User>,
    pub sessions: AttendanceSessionMachine,
    pub processor: CheckInProcessor,
    pub reports: ReportService,
    pub notifications: UnboundedReceiver<Notification>,
}

impl Fixture {
    pub async fn new(student_count: usize) -> Self {
        Self::with_gateway(student_count, 0.95, Duration::ZERO).await
    }

    pub async fn with_gateway(student_count: usize, confidence: f64, delay: Duration) -> Self {
        let store = MemoryStore::new();
        let lecturer = store
            .insert_user(User::new("lee@uni.test", "h", "Lee", UserRole::Lecturer))
            .await
            .unwrap();
        let class = store
            .insert_class(Class::new("Distributed Systems", lecturer.id))
            .await
            .unwrap();

        let mut students = Vec::with_capacity(student_count);
        for i in 0..student_count {
            let student = store
                .insert_user(User::new(
                    format!("student{i}@uni.test"),
                    "h",
                    format!("Student {i}"),
                    UserRole::Student,
                ))
                .await
                .unwrap();
            students.push(student);
        }

        let (channel, notifications) = ChannelNotifier::new();
        let fanout = NotificationFanOut::default().with(Arc::new(channel));
        let shared = Arc::new(store.clone());

        let sessions = AttendanceSessionMachine::new(shared.clone(), shared.clone(), fanout.clone());
        let processor = CheckInProcessor::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            Arc::new(FixedGateway { confidence, delay }),
            Duration::from_millis(200),
            fanout,
        );
        let reports = ReportService::new(shared.clone(), shared.clone(), shared);

        Self {
            store,
            lecturer,
            class,
            students,
            sessions,
            processor,
            reports,
            notifications,
        }
    }

    /// Wait for the background fan-out to deliver `count` notifications.
    pub async fn drain(&mut self, count: usize) -> Vec<Notification> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let next = tokio::time::timeout(Duration::from_secs(2), self.notifications.recv())
                .await
                .expect("timed out waiting for notification")
                .expect("notification channel closed");
            out.push(next);
        }
        out
    }

    /// True if nothing further arrives within a short grace period.
    pub async fn quiet(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(100), self.notifications.recv())
            .await
            .is_err()
    }
}
