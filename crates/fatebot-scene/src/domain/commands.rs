//! Commands for the scene context.

use fatebot_core::channel::ChannelId;
use fatebot_core::command::Command;
use uuid::Uuid;

use super::aggregates::AspectId;

/// Implements `Command` for a struct with `correlation_id` and `channel_id`
/// fields.
macro_rules! scene_command {
    ($name:ident, $type_name:literal) => {
        impl Command for $name {
            fn command_type(&self) -> &'static str {
                $type_name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn channel_id(&self) -> ChannelId {
                self.channel_id
            }
        }
    };
}

/// Command to start a new scene, replacing any existing one.
#[derive(Debug, Clone)]
pub struct StartScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel the scene belongs to.
    pub channel_id: ChannelId,
    /// Optional narrative label.
    pub description: Option<String>,
}

/// Command to end the current scene.
#[derive(Debug, Clone)]
pub struct EndScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel whose scene ends.
    pub channel_id: ChannelId,
}

/// Command to re-render the scene onto the display surface.
#[derive(Debug, Clone)]
pub struct SyncScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel to sync.
    pub channel_id: ChannelId,
}

/// Command to replace or clear the scene description.
#[derive(Debug, Clone)]
pub struct DescribeScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel whose scene is described.
    pub channel_id: ChannelId,
    /// The new description; `None` clears it.
    pub description: Option<String>,
}

/// Command to add a regular aspect.
#[derive(Debug, Clone)]
pub struct AddAspect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel whose scene gains the aspect.
    pub channel_id: ChannelId,
    /// The aspect name.
    pub name: String,
}

/// Command to add a boost.
#[derive(Debug, Clone)]
pub struct AddBoost {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel whose scene gains the boost.
    pub channel_id: ChannelId,
    /// The boost name.
    pub name: String,
}

/// Command to remove one or more aspects.
#[derive(Debug, Clone)]
pub struct RemoveAspects {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel whose scene loses the aspects.
    pub channel_id: ChannelId,
    /// The aspects to remove.
    pub aspect_ids: Vec<AspectId>,
}

/// Command to rename an aspect.
#[derive(Debug, Clone)]
pub struct RenameAspect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel owning the aspect.
    pub channel_id: ChannelId,
    /// The aspect to rename.
    pub aspect_id: AspectId,
    /// The new name.
    pub name: String,
}

/// Command to turn a boost into a regular aspect.
#[derive(Debug, Clone)]
pub struct UpgradeBoost {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel owning the boost.
    pub channel_id: ChannelId,
    /// The boost to upgrade.
    pub aspect_id: AspectId,
    /// Optional new name.
    pub name: Option<String>,
}

/// Command to turn a regular aspect into a boost.
#[derive(Debug, Clone)]
pub struct DowngradeBoost {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel owning the aspect.
    pub channel_id: ChannelId,
    /// The aspect to downgrade.
    pub aspect_id: AspectId,
    /// Optional new name.
    pub name: Option<String>,
}

/// Command to invoke an aspect.
#[derive(Debug, Clone)]
pub struct InvokeAspect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel owning the aspect.
    pub channel_id: ChannelId,
    /// The aspect to invoke.
    pub aspect_id: AspectId,
}

/// Command to add or remove free invokes on an aspect.
#[derive(Debug, Clone)]
pub struct AdjustInvokes {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The channel owning the aspect.
    pub channel_id: ChannelId,
    /// The aspect to adjust.
    pub aspect_id: AspectId,
    /// Signed amount; `None` means `+1`.
    pub amount: Option<i64>,
}

scene_command!(StartScene, "scene.start");
scene_command!(EndScene, "scene.end");
scene_command!(SyncScene, "scene.sync");
scene_command!(DescribeScene, "scene.describe");
scene_command!(AddAspect, "aspect.add");
scene_command!(AddBoost, "boost.add");
scene_command!(RemoveAspects, "aspect.remove");
scene_command!(RenameAspect, "aspect.rename");
scene_command!(UpgradeBoost, "boost.upgrade");
scene_command!(DowngradeBoost, "boost.downgrade");
scene_command!(InvokeAspect, "invoke");
scene_command!(AdjustInvokes, "invoke.add");
