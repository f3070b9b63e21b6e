//! Keeps the display surface in step with stored scene state.

use std::collections::BTreeSet;

use fatebot_core::display::{DisplayError, DisplaySurface};
use fatebot_core::error::DomainError;
use tracing::{debug, warn};

use crate::application::scene_dao::SceneDao;
use crate::domain::aggregates::Scene;
use crate::domain::render::render;

/// Persists the scene and then reconciles its display messages.
///
/// # Errors
///
/// Returns store errors, or `DomainError::Infrastructure` for display
/// transport failures.
pub async fn save_and_update_display(
    scene: &mut Scene,
    dao: &SceneDao<'_>,
    display: &dyn DisplaySurface,
) -> Result<(), DomainError> {
    dao.save(scene).await?;
    update_display(scene, dao, display).await
}

/// Edits every known display message to show the current render. Messages
/// that have vanished are forgotten; if none survive, a new message is
/// posted, recorded, and pinned.
///
/// # Errors
///
/// Returns store errors, or `DomainError::Infrastructure` for display
/// transport failures. A missing message is never an error.
pub async fn update_display(
    scene: &mut Scene,
    dao: &SceneDao<'_>,
    display: &dyn DisplaySurface,
) -> Result<(), DomainError> {
    let channel_id = scene.channel_id();
    let content = render(scene);
    let known: Vec<_> = scene.display_message_ids().iter().copied().collect();
    let mut forgot_any = false;

    for message_id in known {
        match display.edit_message(channel_id, message_id, &content).await {
            Ok(()) => debug!(%channel_id, %message_id, "display message edited"),
            Err(DisplayError::NotFound(_)) => {
                warn!(%channel_id, %message_id, "display message vanished; forgetting it");
                scene.forget_display_message(message_id);
                forgot_any = true;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if scene.display_message_ids().is_empty() {
        let message_id = display.send_message(channel_id, &content).await?;
        scene.set_display_message_ids(BTreeSet::from([message_id]));
        // Record the new message before pinning so a failed pin does not
        // orphan it.
        dao.save(scene).await?;
        display.pin_message(channel_id, message_id).await?;
        debug!(%channel_id, %message_id, "display message created and pinned");
    } else if forgot_any {
        dao.save(scene).await?;
    }

    Ok(())
}

/// Unpins every display message of a scene that is being torn down. Messages
/// that no longer exist are skipped.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` for display transport failures.
pub async fn unpin_display(scene: &mut Scene, display: &dyn DisplaySurface) -> Result<(), DomainError> {
    let channel_id = scene.channel_id();
    for message_id in scene.display_message_ids().clone() {
        match display.unpin_message(channel_id, message_id).await {
            Ok(()) | Err(DisplayError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }
    scene.set_display_message_ids(BTreeSet::new());
    Ok(())
}
