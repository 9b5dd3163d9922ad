//! Background token refresh.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use super::{SessionInner, SessionManager};

/// Refresh the session every `period` until a refresh fails or the session
/// is dropped.
///
/// Holds only a weak reference between ticks, so the task never keeps a
/// session alive on its own.
pub(super) async fn run(session: Weak<SessionInner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = session.upgrade() else {
            break;
        };
        let manager = SessionManager::from_inner(inner);
        if manager.refresh_token().await.is_err() {
            // refresh_token already logged the session out.
            break;
        }
    }
    tracing::debug!("token refresh task stopped");
}
