//! Collaborator sinks for notifications and email.
//!
//! Both are fire-and-forget from the core's perspective: implementations must
//! absorb their own failures, and callers never let a sink error roll back the
//! business operation that triggered it.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A new join request landed; notifies the team leader.
    JoinRequestReceived {
        recipient: Uuid,
        join_request_id: Uuid,
        team_id: Uuid,
        team_name: String,
        requester_name: String,
    },
    /// A join request was accepted; notifies the requester.
    JoinRequestAccepted {
        recipient: Uuid,
        team_id: Uuid,
        team_name: String,
    },
    /// A join request was rejected; notifies the requester.
    JoinRequestRejected {
        recipient: Uuid,
        team_id: Uuid,
        team_name: String,
    },
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &NotificationEvent);
}

pub trait EmailSink: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str);
}

/// Sink that records events in the log stream. Stands in for the real
/// delivery pipeline, which is owned by another service.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, event: &NotificationEvent) {
        match event {
            NotificationEvent::JoinRequestReceived {
                recipient,
                join_request_id,
                team_name,
                requester_name,
                ..
            } => tracing::info!(
                %recipient,
                %join_request_id,
                team_name,
                requester_name,
                "notification: join request received"
            ),
            NotificationEvent::JoinRequestAccepted {
                recipient,
                team_name,
                ..
            } => tracing::info!(%recipient, team_name, "notification: join request accepted"),
            NotificationEvent::JoinRequestRejected {
                recipient,
                team_name,
                ..
            } => tracing::info!(%recipient, team_name, "notification: join request rejected"),
        }
    }
}

pub struct LogEmailer;

impl EmailSink for LogEmailer {
    fn send(&self, to: &str, subject: &str, _body: &str) {
        tracing::info!(to, subject, "email queued");
    }
}
