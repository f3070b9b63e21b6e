//! The scene document and its aspects.

use std::collections::BTreeSet;
use std::fmt;

use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::error::DomainError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of an aspect within its scene. Assigned by the scene, never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectId(pub u64);

impl fmt::Display for AspectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AspectId> for DomainError {
    fn from(id: AspectId) -> Self {
        Self::AspectNotFound(id.0)
    }
}

/// Returns every rule a proposed aspect name breaks.
fn name_complaints(name: &str) -> Vec<String> {
    let mut complaints = Vec::new();
    if name.trim().is_empty() {
        complaints.push("an aspect must have a name".to_owned());
    }
    if name.contains(['\n', '\r']) {
        complaints.push("an aspect name must be one line".to_owned());
    }
    complaints
}

/// Validates an aspect name and returns it trimmed.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is empty or spans lines.
pub fn validate_aspect_name(name: &str) -> Result<String, DomainError> {
    let complaints = name_complaints(name);
    if complaints.is_empty() {
        Ok(name.trim().to_owned())
    } else {
        Err(DomainError::validation("invalid aspect name", complaints))
    }
}

/// A named narrative tag on a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aspect {
    name: String,
    boost: bool,
    invokes: u32,
}

impl Aspect {
    /// Creates a regular aspect with no free invokes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is invalid.
    pub fn new(name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            name: validate_aspect_name(name)?,
            boost: false,
            invokes: 0,
        })
    }

    /// Creates a boost: a temporary aspect carrying exactly one free invoke.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is invalid.
    pub fn new_boost(name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            name: validate_aspect_name(name)?,
            boost: true,
            invokes: 1,
        })
    }

    /// Rebuilds an aspect from stored fields, checking the name.
    pub(crate) fn from_parts(name: String, boost: bool, invokes: u32) -> Result<Self, Vec<String>> {
        let complaints = name_complaints(&name);
        if !complaints.is_empty() {
            return Err(complaints);
        }
        Ok(Self {
            name,
            boost,
            invokes,
        })
    }

    /// The aspect's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this aspect is a boost.
    #[must_use]
    pub fn is_boost(&self) -> bool {
        self.boost
    }

    /// Remaining free invokes.
    #[must_use]
    pub fn invokes(&self) -> u32 {
        self.invokes
    }

    /// Adds `delta` (possibly negative) to the invoke counter and returns the
    /// new count.
    ///
    /// Underflow is rejected rather than clamped; the aspect is left
    /// untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the result would be negative or
    /// would not fit the counter.
    pub fn adjust_invokes(&mut self, delta: i64) -> Result<u32, DomainError> {
        let proposed = i64::from(self.invokes).saturating_add(delta);
        let mut complaints = Vec::new();
        if proposed < 0 {
            complaints.push("invokes cannot go below zero".to_owned());
        }
        let Ok(invokes) = u32::try_from(proposed) else {
            if complaints.is_empty() {
                complaints.push(format!("invokes cannot exceed {}", u32::MAX));
            }
            return Err(DomainError::validation("invalid invoke adjustment", complaints));
        };
        self.invokes = invokes;
        Ok(invokes)
    }

    /// Consumes one free invoke if any remain. Returns whether one was
    /// consumed; an aspect with no free invokes can still be invoked and
    /// stays at zero.
    pub fn spend_invoke(&mut self) -> bool {
        if self.invokes == 0 {
            return false;
        }
        self.invokes -= 1;
        true
    }
}

/// Result of invoking an aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeOutcome {
    /// Whether a free invoke was consumed.
    pub consumed_free_invoke: bool,
    /// Free invokes left on the aspect.
    pub remaining_invokes: u32,
}

/// The narrative state tracked for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    channel_id: ChannelId,
    description: Option<String>,
    aspects: IndexMap<AspectId, Aspect>,
    next_aspect_id: u64,
    display_message_ids: BTreeSet<MessageId>,
}

/// Trims a description, treating blank text as no description.
fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}

impl Scene {
    /// Creates an empty scene for a channel.
    #[must_use]
    pub fn new(channel_id: ChannelId, description: Option<&str>) -> Self {
        Self {
            channel_id,
            description: normalize_description(description),
            aspects: IndexMap::new(),
            next_aspect_id: 1,
            display_message_ids: BTreeSet::new(),
        }
    }

    /// Rebuilds a scene from stored parts. Returns every invariant the parts
    /// violate.
    pub(crate) fn from_parts(
        channel_id: ChannelId,
        description: Option<String>,
        aspects: Vec<(AspectId, Aspect)>,
        next_aspect_id: u64,
        display_message_ids: BTreeSet<MessageId>,
    ) -> Result<Self, Vec<String>> {
        let mut complaints = Vec::new();
        if next_aspect_id == 0 {
            complaints.push("next aspect id must be at least 1".to_owned());
        }
        let mut map = IndexMap::with_capacity(aspects.len());
        for (id, aspect) in aspects {
            if id.0 >= next_aspect_id {
                complaints.push(format!(
                    "aspect id {id} is not below next aspect id {next_aspect_id}"
                ));
            }
            if map.insert(id, aspect).is_some() {
                complaints.push(format!("aspect id {id} appears more than once"));
            }
        }
        if !complaints.is_empty() {
            return Err(complaints);
        }
        Ok(Self {
            channel_id,
            description,
            aspects: map,
            next_aspect_id,
            display_message_ids,
        })
    }

    /// The channel that owns this scene.
    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// The scene description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replaces (or clears) the description.
    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = normalize_description(description);
    }

    /// The id the next added aspect will receive.
    #[must_use]
    pub fn next_aspect_id(&self) -> AspectId {
        AspectId(self.next_aspect_id)
    }

    /// Aspects in insertion order.
    pub fn aspects(&self) -> impl Iterator<Item = (AspectId, &Aspect)> {
        self.aspects.iter().map(|(id, aspect)| (*id, aspect))
    }

    /// Ids of the external messages currently showing this scene.
    #[must_use]
    pub fn display_message_ids(&self) -> &BTreeSet<MessageId> {
        &self.display_message_ids
    }

    /// Replaces the set of display message ids.
    pub fn set_display_message_ids(&mut self, ids: BTreeSet<MessageId>) {
        self.display_message_ids = ids;
    }

    /// Forgets a display message that no longer exists.
    pub fn forget_display_message(&mut self, message_id: MessageId) -> bool {
        self.display_message_ids.remove(&message_id)
    }

    /// Appends an aspect and returns its newly assigned id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the scene has no ids left to
    /// assign.
    pub fn add_aspect(&mut self, aspect: Aspect) -> Result<AspectId, DomainError> {
        let next = self.next_aspect_id.checked_add(1).ok_or_else(|| {
            DomainError::validation(
                "cannot add aspect",
                vec!["the scene has run out of aspect ids".to_owned()],
            )
        })?;
        let id = AspectId(self.next_aspect_id);
        self.aspects.insert(id, aspect);
        self.next_aspect_id = next;
        Ok(id)
    }

    /// Looks up an aspect.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound` if the id is absent.
    pub fn aspect(&self, aspect_id: AspectId) -> Result<&Aspect, DomainError> {
        self.aspects.get(&aspect_id).ok_or_else(|| aspect_id.into())
    }

    /// Removes an aspect, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound` if the id is absent.
    pub fn remove_aspect(&mut self, aspect_id: AspectId) -> Result<Aspect, DomainError> {
        self.aspects
            .shift_remove(&aspect_id)
            .ok_or_else(|| aspect_id.into())
    }

    /// Removes several aspects. Either all are removed or none are.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `aspect_ids` is empty, or
    /// `DomainError::AspectNotFound` for the first id that is absent.
    pub fn remove_aspects(&mut self, aspect_ids: &[AspectId]) -> Result<(), DomainError> {
        if aspect_ids.is_empty() {
            return Err(DomainError::validation(
                "nothing to remove",
                vec!["at least one aspect id is required".to_owned()],
            ));
        }
        if let Some(missing) = aspect_ids.iter().find(|id| !self.aspects.contains_key(*id)) {
            return Err((*missing).into());
        }
        for id in aspect_ids {
            self.aspects.shift_remove(id);
        }
        Ok(())
    }

    /// Overwrites an aspect in place, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound` if the id is absent.
    pub fn replace_aspect(&mut self, aspect_id: AspectId, aspect: Aspect) -> Result<(), DomainError> {
        let slot = self
            .aspects
            .get_mut(&aspect_id)
            .ok_or_else(|| DomainError::from(aspect_id))?;
        *slot = aspect;
        Ok(())
    }

    /// Renames an aspect.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound` or `DomainError::Validation`.
    pub fn rename_aspect(&mut self, aspect_id: AspectId, name: &str) -> Result<(), DomainError> {
        let mut aspect = self.aspect(aspect_id)?.clone();
        aspect.name = validate_aspect_name(name)?;
        self.replace_aspect(aspect_id, aspect)
    }

    /// Turns a boost into a regular aspect, optionally renaming it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound`, or `DomainError::Validation`
    /// listing every problem (not a boost, bad name).
    pub fn upgrade_boost(&mut self, aspect_id: AspectId, name: Option<&str>) -> Result<(), DomainError> {
        self.toggle_boost(aspect_id, false, name)
    }

    /// Turns a regular aspect into a boost, optionally renaming it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound`, or `DomainError::Validation`
    /// listing every problem (already a boost, bad name).
    pub fn downgrade_boost(&mut self, aspect_id: AspectId, name: Option<&str>) -> Result<(), DomainError> {
        self.toggle_boost(aspect_id, true, name)
    }

    fn toggle_boost(
        &mut self,
        aspect_id: AspectId,
        boost: bool,
        name: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut aspect = self.aspect(aspect_id)?.clone();
        let mut complaints = Vec::new();
        match (aspect.boost, boost) {
            (false, false) => complaints.push(format!("aspect {aspect_id} is not a boost")),
            (true, true) => complaints.push(format!("aspect {aspect_id} is already a boost")),
            _ => {}
        }
        if let Some(name) = name {
            complaints.extend(name_complaints(name));
        }
        if !complaints.is_empty() {
            return Err(DomainError::validation(
                format!("the result for aspect {aspect_id} is not valid"),
                complaints,
            ));
        }
        aspect.boost = boost;
        if let Some(name) = name {
            aspect.name = name.trim().to_owned();
        }
        self.replace_aspect(aspect_id, aspect)
    }

    /// Adjusts an aspect's free invokes by `delta`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound`, or `DomainError::Validation` if
    /// the count would go below zero.
    pub fn adjust_invokes(&mut self, aspect_id: AspectId, delta: i64) -> Result<u32, DomainError> {
        let mut aspect = self.aspect(aspect_id)?.clone();
        let invokes = aspect.adjust_invokes(delta).map_err(|err| match err {
            DomainError::Validation { complaints, .. } => DomainError::validation(
                format!("the result for aspect {aspect_id} is not valid"),
                complaints,
            ),
            other => other,
        })?;
        self.replace_aspect(aspect_id, aspect)?;
        Ok(invokes)
    }

    /// Invokes an aspect, consuming a free invoke when one remains.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AspectNotFound` if the id is absent.
    pub fn invoke_aspect(&mut self, aspect_id: AspectId) -> Result<InvokeOutcome, DomainError> {
        let mut aspect = self.aspect(aspect_id)?.clone();
        let consumed_free_invoke = aspect.spend_invoke();
        let remaining_invokes = aspect.invokes;
        self.replace_aspect(aspect_id, aspect)?;
        Ok(InvokeOutcome {
            consumed_free_invoke,
            remaining_invokes,
        })
    }
}
