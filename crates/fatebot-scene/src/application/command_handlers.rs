//! Command handlers for the scene context.
//!
//! Each handler runs as one unit under the channel's guard: load the current
//! scene, apply the mutation, persist, then reconcile the display. A failure
//! at any step aborts the rest and the guard is released on every exit path,
//! including cancellation of the calling task.

use fatebot_core::channel::ChannelId;
use fatebot_core::clock::Clock;
use fatebot_core::command::Command;
use fatebot_core::display::DisplaySurface;
use fatebot_core::error::DomainError;
use fatebot_core::repository::SceneRepository;
use tracing::{debug, info, instrument, warn};

use crate::application::channel_guard::ChannelGuards;
use crate::application::query_handlers::SceneView;
use crate::application::reconcile::{save_and_update_display, unpin_display, update_display};
use crate::application::scene_dao::SceneDao;
use crate::domain::aggregates::{Aspect, AspectId, InvokeOutcome, Scene};
use crate::domain::commands::{
    AddAspect, AddBoost, AdjustInvokes, DescribeScene, DowngradeBoost, EndScene, InvokeAspect,
    RemoveAspects, RenameAspect, StartScene, SyncScene, UpgradeBoost,
};

/// Result of a successfully handled command.
#[derive(Debug, Clone)]
pub struct SceneCommandResult<T> {
    /// Command-specific outcome.
    pub outcome: T,
    /// The scene as persisted and displayed after the command.
    pub scene: SceneView,
}

/// Collaborators every scene command needs.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    /// Time source for document timestamps.
    pub clock: &'a dyn Clock,
    /// Per-channel guard registry.
    pub guards: &'a ChannelGuards,
    /// Scene document store.
    pub repo: &'a dyn SceneRepository,
    /// Where scenes are rendered.
    pub display: &'a dyn DisplaySurface,
}

impl<'a> SceneContext<'a> {
    fn dao(&self) -> SceneDao<'a> {
        SceneDao::new(self.repo, self.clock)
    }
}

/// Runs `mutate` against the channel's current scene under its guard, then
/// persists and re-renders.
async fn with_current_scene<C, T, F>(
    command: &C,
    ctx: SceneContext<'_>,
    mutate: F,
) -> Result<SceneCommandResult<T>, DomainError>
where
    C: Command,
    F: FnOnce(&mut Scene) -> Result<T, DomainError> + Send,
    T: Send,
{
    let channel_id = command.channel_id();
    let _guard = ctx.guards.lock(channel_id).await;
    let dao = ctx.dao();

    let mut scene = dao.find(channel_id).await?;
    let outcome = mutate(&mut scene)?;
    save_and_update_display(&mut scene, &dao, ctx.display).await?;

    debug!(command_type = command.command_type(), "scene mutated");
    Ok(SceneCommandResult {
        outcome,
        scene: SceneView::from(&scene),
    })
}

/// Removes a channel's stored scene and unpins its display messages. A
/// missing scene is fine; an unreadable one is dropped.
async fn tear_down_existing(channel_id: ChannelId, ctx: SceneContext<'_>) -> Result<(), DomainError> {
    let dao = ctx.dao();
    match dao.find(channel_id).await {
        Ok(mut existing) => {
            dao.remove(channel_id).await?;
            unpin_display(&mut existing, ctx.display).await?;
            info!(%channel_id, "previous scene ended");
        }
        Err(DomainError::NoCurrentScene(_)) => {}
        Err(err @ (DomainError::UnsupportedSchemaVersion { .. } | DomainError::CorruptDocument { .. })) => {
            warn!(
                %channel_id,
                error = %err,
                "replacing unreadable scene document; its display messages could not be unpinned"
            );
            dao.remove(channel_id).await?;
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

/// Handles `StartScene`: ends any existing scene, then creates, saves, and
/// displays a new one.
///
/// # Errors
///
/// Returns store errors, or `DomainError::Infrastructure` for display
/// transport failures.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_start_scene(
    command: &StartScene,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    let channel_id = command.channel_id;
    let _guard = ctx.guards.lock(channel_id).await;

    tear_down_existing(channel_id, ctx).await?;

    let mut scene = Scene::new(channel_id, command.description.as_deref());
    save_and_update_display(&mut scene, &ctx.dao(), ctx.display).await?;

    info!("scene started");
    Ok(SceneCommandResult {
        outcome: (),
        scene: SceneView::from(&scene),
    })
}

/// Handles `EndScene`: deletes the scene and unpins its display messages.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` if the channel has no scene.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_end_scene(command: &EndScene, ctx: SceneContext<'_>) -> Result<(), DomainError> {
    let channel_id = command.channel_id;
    let _guard = ctx.guards.lock(channel_id).await;
    let dao = ctx.dao();

    let mut scene = dao.find(channel_id).await?;
    dao.remove(channel_id).await?;
    unpin_display(&mut scene, ctx.display).await?;

    info!("scene ended");
    Ok(())
}

/// Handles `SyncScene`: re-renders stored state onto the display without
/// mutating the scene.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` if the channel has no scene.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_sync_scene(
    command: &SyncScene,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    let channel_id = command.channel_id;
    let _guard = ctx.guards.lock(channel_id).await;
    let dao = ctx.dao();

    let mut scene = dao.find(channel_id).await?;
    update_display(&mut scene, &dao, ctx.display).await?;

    Ok(SceneCommandResult {
        outcome: (),
        scene: SceneView::from(&scene),
    })
}

/// Handles `DescribeScene`: replaces or clears the description.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` if the channel has no scene.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_describe_scene(
    command: &DescribeScene,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.set_description(command.description.as_deref());
        Ok(())
    })
    .await
}

/// Handles `AddAspect` and returns the new aspect's id.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` or `DomainError::Validation`.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_add_aspect(
    command: &AddAspect,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<AspectId>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.add_aspect(Aspect::new(&command.name)?)
    })
    .await
}

/// Handles `AddBoost` and returns the new boost's id.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` or `DomainError::Validation`.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_add_boost(
    command: &AddBoost,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<AspectId>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.add_aspect(Aspect::new_boost(&command.name)?)
    })
    .await
}

/// Handles `RemoveAspects`. Nothing is removed unless every id exists.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene`, `DomainError::AspectNotFound`, or
/// `DomainError::Validation` for an empty id list.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_remove_aspects(
    command: &RemoveAspects,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    with_current_scene(command, ctx, |scene| scene.remove_aspects(&command.aspect_ids)).await
}

/// Handles `RenameAspect`.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene`, `DomainError::AspectNotFound`, or
/// `DomainError::Validation`.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_rename_aspect(
    command: &RenameAspect,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.rename_aspect(command.aspect_id, &command.name)
    })
    .await
}

/// Handles `UpgradeBoost`.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene`, `DomainError::AspectNotFound`, or
/// `DomainError::Validation` if the aspect is not a boost or the name is bad.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_upgrade_boost(
    command: &UpgradeBoost,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.upgrade_boost(command.aspect_id, command.name.as_deref())
    })
    .await
}

/// Handles `DowngradeBoost`.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene`, `DomainError::AspectNotFound`, or
/// `DomainError::Validation` if the aspect is already a boost or the name is
/// bad.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_downgrade_boost(
    command: &DowngradeBoost,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<()>, DomainError> {
    with_current_scene(command, ctx, |scene| {
        scene.downgrade_boost(command.aspect_id, command.name.as_deref())
    })
    .await
}

/// Handles `InvokeAspect`.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` or `DomainError::AspectNotFound`.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_invoke_aspect(
    command: &InvokeAspect,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<InvokeOutcome>, DomainError> {
    with_current_scene(command, ctx, |scene| scene.invoke_aspect(command.aspect_id)).await
}

/// Handles `AdjustInvokes` and returns the new invoke count.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene`, `DomainError::AspectNotFound`, or
/// `DomainError::Validation` if the count would go below zero.
#[instrument(skip_all, fields(channel_id = %command.channel_id, correlation_id = %command.correlation_id))]
pub async fn handle_adjust_invokes(
    command: &AdjustInvokes,
    ctx: SceneContext<'_>,
) -> Result<SceneCommandResult<u32>, DomainError> {
    let delta = command.amount.unwrap_or(1);
    with_current_scene(command, ctx, |scene| {
        scene.adjust_invokes(command.aspect_id, delta)
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use fatebot_core::channel::MessageId;
    use fatebot_core::repository::StoredScene;
    use fatebot_test_support::{
        FailingSceneRepository, FixedClock, InMemorySceneRepository, RecordingDisplaySurface,
    };
    use uuid::Uuid;

    use super::*;

    struct Harness {
        clock: FixedClock,
        guards: ChannelGuards,
        repo: InMemorySceneRepository,
        display: RecordingDisplaySurface,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: FixedClock::at(2026, 1, 15, 10, 0, 0),
                guards: ChannelGuards::new(),
                repo: InMemorySceneRepository::new(),
                display: RecordingDisplaySurface::new(),
            }
        }

        fn ctx(&self) -> SceneContext<'_> {
            SceneContext {
                clock: &self.clock,
                guards: &self.guards,
                repo: &self.repo,
                display: &self.display,
            }
        }

        async fn start(&self, channel_id: ChannelId, description: Option<&str>) -> SceneView {
            let command = StartScene {
                correlation_id: Uuid::new_v4(),
                channel_id,
                description: description.map(str::to_owned),
            };
            handle_start_scene(&command, self.ctx()).await.unwrap().scene
        }

        async fn add(&self, channel_id: ChannelId, name: &str) -> AspectId {
            let command = AddAspect {
                correlation_id: Uuid::new_v4(),
                channel_id,
                name: name.to_owned(),
            };
            handle_add_aspect(&command, self.ctx()).await.unwrap().outcome
        }
    }

    const CHANNEL: ChannelId = ChannelId(77);

    #[tokio::test]
    async fn test_start_scene_saves_and_pins_display() {
        // Arrange
        let harness = Harness::new();

        // Act
        let view = harness.start(CHANNEL, Some("Opening night")).await;

        // Assert
        assert_eq!(view.display_message_ids.len(), 1);
        let message_id = view.display_message_ids[0];
        assert!(harness.display.is_pinned(CHANNEL, message_id));
        assert_eq!(
            harness.display.content(CHANNEL, message_id).as_deref(),
            Some("Opening night\nNo aspects in this scene.")
        );
        let stored = harness.repo.stored(CHANNEL).unwrap();
        assert_eq!(stored.updated_at, harness.clock.0);
    }

    #[tokio::test]
    async fn test_start_scene_replaces_existing_and_unpins_old_message() {
        // Arrange
        let harness = Harness::new();
        let first = harness.start(CHANNEL, Some("Act one")).await;
        harness.add(CHANNEL, "Lingering Smoke").await;
        let old_message = first.display_message_ids[0];

        // Act
        let second = harness.start(CHANNEL, Some("Act two")).await;

        // Assert
        assert!(!harness.display.is_pinned(CHANNEL, old_message));
        assert_ne!(second.display_message_ids[0], old_message);
        assert!(second.aspects.is_empty());
        assert_eq!(second.next_aspect_id, AspectId(1));
    }

    #[tokio::test]
    async fn test_start_scene_replaces_legacy_document() {
        // Arrange
        let harness = Harness::new();
        harness.repo.insert(StoredScene {
            channel_id: CHANNEL,
            document: serde_json::json!({ "_v": 0, "channel_id": 77 }),
            updated_at: Utc::now(),
        });

        // Act
        let view = harness.start(CHANNEL, None).await;

        // Assert
        assert_eq!(view.description, None);
        assert_eq!(
            crate::domain::document::schema_version_of(&harness.repo.stored(CHANNEL).unwrap().document),
            Some(crate::domain::document::CURRENT_SCHEMA_VERSION)
        );
    }

    #[tokio::test]
    async fn test_mutation_without_scene_fails_with_no_current_scene() {
        // Arrange
        let harness = Harness::new();
        let command = AddAspect {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            name: "On Fire".to_owned(),
        };

        // Act
        let result = handle_add_aspect(&command, harness.ctx()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::NoCurrentScene(id)) if id == CHANNEL));
        assert_eq!(harness.display.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_aspect_ids_follow_add_remove_add() {
        // Arrange
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;

        // Act
        let first = harness.add(CHANNEL, "On Fire").await;
        let second = harness.add(CHANNEL, "Flooded").await;
        let remove = RemoveAspects {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_ids: vec![first],
        };
        handle_remove_aspects(&remove, harness.ctx()).await.unwrap();
        let third = harness.add(CHANNEL, "Dark").await;

        // Assert
        assert_eq!((first, second, third), (AspectId(1), AspectId(2), AspectId(3)));
    }

    #[tokio::test]
    async fn test_validation_failure_persists_nothing() {
        // Arrange
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;
        let id = harness.add(CHANNEL, "Cover").await;
        let before = harness.repo.stored(CHANNEL).unwrap();
        let command = AdjustInvokes {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
            amount: Some(-1),
        };

        // Act
        let result = handle_adjust_invokes(&command, harness.ctx()).await;

        // Assert
        match result {
            Err(DomainError::Validation { complaints, .. }) => {
                assert_eq!(complaints, vec!["invokes cannot go below zero".to_owned()]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(harness.repo.stored(CHANNEL).unwrap(), before);
        assert!(harness.guards.try_lock(CHANNEL).is_some());
    }

    #[tokio::test]
    async fn test_adjust_invokes_defaults_to_one_and_invoke_spends_it() {
        // Arrange
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;
        let id = harness.add(CHANNEL, "High Ground").await;
        let adjust = AdjustInvokes {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
            amount: None,
        };
        let invoke = InvokeAspect {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
        };

        // Act
        let adjusted = handle_adjust_invokes(&adjust, harness.ctx()).await.unwrap();
        let invoked = handle_invoke_aspect(&invoke, harness.ctx()).await.unwrap();

        // Assert
        assert_eq!(adjusted.outcome, 1);
        assert!(adjusted.scene.rendered.ends_with("[1] High Ground (invokes=1)"));
        assert!(invoked.outcome.consumed_free_invoke);
        assert_eq!(invoked.outcome.remaining_invokes, 0);
        assert!(invoked.scene.rendered.ends_with("[1] High Ground"));
    }

    #[tokio::test]
    async fn test_boost_lifecycle_through_handlers() {
        // Arrange
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;
        let add = AddBoost {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            name: "Momentum".to_owned(),
        };
        let id = handle_add_boost(&add, harness.ctx()).await.unwrap().outcome;

        // Act
        let upgrade = UpgradeBoost {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
            name: Some("Unstoppable".to_owned()),
        };
        let upgraded = handle_upgrade_boost(&upgrade, harness.ctx()).await.unwrap();
        let again = handle_upgrade_boost(&upgrade, harness.ctx()).await;
        let downgrade = DowngradeBoost {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
            name: None,
        };
        let downgraded = handle_downgrade_boost(&downgrade, harness.ctx()).await.unwrap();

        // Assert
        assert!(!upgraded.scene.aspects[0].boost);
        assert_eq!(upgraded.scene.aspects[0].name, "Unstoppable");
        assert!(matches!(again, Err(DomainError::Validation { .. })));
        assert!(downgraded.scene.aspects[0].boost);
    }

    #[tokio::test]
    async fn test_rename_and_describe() {
        let harness = Harness::new();
        harness.start(CHANNEL, Some("Old")).await;
        let id = harness.add(CHANNEL, "Misty").await;

        let rename = RenameAspect {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: id,
            name: "Foggy".to_owned(),
        };
        handle_rename_aspect(&rename, harness.ctx()).await.unwrap();
        let describe = DescribeScene {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            description: Some("New".to_owned()),
        };
        let result = handle_describe_scene(&describe, harness.ctx()).await.unwrap();

        assert_eq!(result.scene.rendered, "New\n[1] Foggy");
    }

    #[tokio::test]
    async fn test_rename_missing_aspect_fails_with_aspect_not_found() {
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;
        let rename = RenameAspect {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
            aspect_id: AspectId(12),
            name: "Nope".to_owned(),
        };

        let result = handle_rename_aspect(&rename, harness.ctx()).await;

        assert!(matches!(result, Err(DomainError::AspectNotFound(12))));
    }

    #[tokio::test]
    async fn test_end_scene_removes_document_and_unpins() {
        // Arrange
        let harness = Harness::new();
        let view = harness.start(CHANNEL, None).await;
        let end = EndScene {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
        };

        // Act
        handle_end_scene(&end, harness.ctx()).await.unwrap();

        // Assert
        assert!(harness.repo.stored(CHANNEL).is_none());
        assert!(!harness.display.is_pinned(CHANNEL, view.display_message_ids[0]));
        assert!(matches!(
            handle_end_scene(&end, harness.ctx()).await,
            Err(DomainError::NoCurrentScene(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_recreates_deleted_display_message() {
        // Arrange
        let harness = Harness::new();
        let view = harness.start(CHANNEL, Some("Crossroads")).await;
        let stale = view.display_message_ids[0];
        harness.display.delete_message(CHANNEL, stale);
        let sync = SyncScene {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
        };

        // Act
        let synced = handle_sync_scene(&sync, harness.ctx()).await.unwrap();

        // Assert
        let fresh = synced.scene.display_message_ids[0];
        assert_ne!(fresh, stale);
        assert!(harness.display.is_pinned(CHANNEL, fresh));
        let stored = harness.repo.stored(CHANNEL).unwrap();
        let scene = crate::domain::document::decode_scene(CHANNEL, &stored.document).unwrap();
        assert_eq!(scene.display_message_ids(), &BTreeSet::from([fresh]));
    }

    #[tokio::test]
    async fn test_mutation_edits_existing_message_without_new_post() {
        let harness = Harness::new();
        harness.start(CHANNEL, None).await;

        harness.add(CHANNEL, "Rickety Bridge").await;
        harness.add(CHANNEL, "Rushing River").await;

        assert_eq!(harness.display.sent_count(), 1);
        assert_eq!(harness.display.pinned_count(CHANNEL), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_and_releases_guard() {
        // Arrange
        let clock = FixedClock(Utc::now());
        let guards = ChannelGuards::new();
        let display = RecordingDisplaySurface::new();
        let ctx = SceneContext {
            clock: &clock,
            guards: &guards,
            repo: &FailingSceneRepository,
            display: &display,
        };
        let command = SyncScene {
            correlation_id: Uuid::new_v4(),
            channel_id: CHANNEL,
        };

        // Act
        let result = handle_sync_scene(&command, ctx).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(guards.try_lock(CHANNEL).is_some());
        assert!(display.content(CHANNEL, MessageId(1)).is_none());
    }
}
