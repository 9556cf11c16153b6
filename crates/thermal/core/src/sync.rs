//! Change detection and fan-out target selection for remote observers.
//!
//! A [`ChangeNotifier`] lives next to each tracked state. After every tick it
//! compares the state against what it last published and produces the
//! messages observers need; [`SyncPublisher`] carries them out of the core.

use crate::channel::{Channel, ChannelSet};
use crate::config::TemperatureConfig;
use crate::modifier::EntityId;
use crate::state::{ChainSnapshot, TemperatureSnapshot, TemperatureState};

/// How an entity's updates fan out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TrackedKind {
    Player,
    Creature,
}

/// Who receives a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncTarget {
    /// Only the entity itself.
    Recipient(EntityId),
    /// Everyone tracking the entity, excluding it.
    Trackers(EntityId),
    /// Everyone tracking the entity, and the entity.
    TrackersAndSelf(EntityId),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncPayload {
    /// Stored scalars in [`Channel::STORED`] order.
    Temperatures { values: [f64; 5], instant: bool },
    /// Full modifier lists of the listed chains.
    Modifiers { chains: Vec<ChainSnapshot> },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncMessage {
    pub entity: EntityId,
    pub target: SyncTarget,
    pub payload: SyncPayload,
}

/// Outbound contract for sync messages.
pub trait SyncPublisher: Send + Sync {
    fn publish(&self, message: SyncMessage);
}

/// Tracks what has been published for one entity.
#[derive(Clone, Debug, Default)]
pub struct ChangeNotifier {
    last_values: Option<[f64; 5]>,
    last_digest: Option<[u8; 32]>,
    force_temperatures: bool,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish temperatures on the next collect and mark them instant, so
    /// observers skip interpolation.
    pub fn force_temperatures(&mut self) {
        self.force_temperatures = true;
    }

    /// Forget everything published so the next collect resends all of it.
    pub fn invalidate(&mut self) {
        self.last_values = None;
        self.last_digest = None;
    }

    /// Builds the messages needed to bring observers up to date.
    ///
    /// Consumes the state's pending modifier changes.
    pub fn collect(
        &mut self,
        entity: EntityId,
        kind: TrackedKind,
        state: &mut TemperatureState,
        age: u64,
        config: &TemperatureConfig,
    ) -> Vec<SyncMessage> {
        let mut messages = Vec::new();
        let snapshot = state.snapshot();
        let values = snapshot.values();

        let instant = std::mem::take(&mut self.force_temperatures);
        if instant || self.last_values != Some(values) {
            self.last_values = Some(values);
            messages.push(SyncMessage {
                entity,
                target: Self::temperature_target(entity, kind),
                payload: SyncPayload::Temperatures { values, instant },
            });
        }

        let changes = state.take_modifier_changes();
        let digest = snapshot.modifier_digest();
        let structural = !changes.is_empty() && self.last_digest != Some(digest);
        let periodic = kind == TrackedKind::Player
            && config.modifier_resync_interval > 0
            && age % config.modifier_resync_interval == 0;

        if structural || periodic {
            self.last_digest = Some(digest);
            let channels = if structural { changes } else { ChannelSet::all() };
            messages.push(SyncMessage {
                entity,
                target: Self::modifier_target(entity, kind),
                payload: SyncPayload::Modifiers {
                    chains: Self::select(snapshot, channels),
                },
            });
        }

        messages
    }

    /// [`ChangeNotifier::collect`] followed by publishing every message.
    pub fn flush(
        &mut self,
        entity: EntityId,
        kind: TrackedKind,
        state: &mut TemperatureState,
        age: u64,
        config: &TemperatureConfig,
        publisher: &dyn SyncPublisher,
    ) -> usize {
        let messages = self.collect(entity, kind, state, age, config);
        let count = messages.len();
        messages.into_iter().for_each(|message| publisher.publish(message));
        count
    }

    fn temperature_target(entity: EntityId, kind: TrackedKind) -> SyncTarget {
        match kind {
            TrackedKind::Player => SyncTarget::Recipient(entity),
            TrackedKind::Creature => SyncTarget::TrackersAndSelf(entity),
        }
    }

    fn modifier_target(entity: EntityId, kind: TrackedKind) -> SyncTarget {
        match kind {
            TrackedKind::Player => SyncTarget::Recipient(entity),
            TrackedKind::Creature => SyncTarget::Trackers(entity),
        }
    }

    fn select(snapshot: TemperatureSnapshot, channels: ChannelSet) -> Vec<ChainSnapshot> {
        snapshot
            .chains
            .into_iter()
            .filter(|chain| channels.contains(chain.channel.flag()))
            .collect()
    }
}

/// Channels whose chains are in a modifiers payload.
pub fn payload_channels(payload: &SyncPayload) -> Vec<Channel> {
    match payload {
        SyncPayload::Modifiers { chains } => chains.iter().map(|chain| chain.channel).collect(),
        SyncPayload::Temperatures { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::chain::Addition;
    use crate::modifier::{Modifier, ModifierKind};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<SyncMessage>>);

    impl SyncPublisher for Recorder {
        fn publish(&self, message: SyncMessage) {
            self.0.lock().unwrap().push(message);
        }
    }

    fn config() -> TemperatureConfig {
        TemperatureConfig::default()
    }

    #[test]
    fn unchanged_state_publishes_nothing() {
        let mut notifier = ChangeNotifier::new();
        let mut state = TemperatureState::new();
        let entity = EntityId(4);

        let first = notifier.collect(entity, TrackedKind::Creature, &mut state, 1, &config());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].target, SyncTarget::TrackersAndSelf(entity));

        let second = notifier.collect(entity, TrackedKind::Creature, &mut state, 2, &config());
        assert!(second.is_empty());
    }

    #[test]
    fn modifier_changes_fan_out_to_trackers() {
        let mut notifier = ChangeNotifier::new();
        let mut state = TemperatureState::new();
        let entity = EntityId(4);
        notifier.collect(entity, TrackedKind::Creature, &mut state, 1, &config());

        state.add_modifier(
            Channel::Rate,
            Modifier::new(ModifierKind::Mount {
                warming: 20.0,
                cooling: 20.0,
            }),
            false,
            &Addition::at_end(),
        );
        let messages = notifier.collect(entity, TrackedKind::Creature, &mut state, 2, &config());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].target, SyncTarget::Trackers(entity));
        assert_eq!(payload_channels(&messages[0].payload), vec![Channel::Rate]);
    }

    #[test]
    fn identical_replacement_is_not_resent() {
        let mut notifier = ChangeNotifier::new();
        let mut state = TemperatureState::new();
        let entity = EntityId(4);
        let fire = || Modifier::new(ModifierKind::Fire).expires(5);

        state.add_modifier(Channel::Base, fire(), false, &Addition::replace_or_add("thermal:fire"));
        assert_eq!(notifier.collect(entity, TrackedKind::Creature, &mut state, 1, &config()).len(), 2);

        state.add_modifier(Channel::Base, fire(), false, &Addition::replace_or_add("thermal:fire"));
        assert!(notifier.collect(entity, TrackedKind::Creature, &mut state, 2, &config()).is_empty());
    }

    #[test]
    fn players_resync_periodically_and_on_request() {
        let mut notifier = ChangeNotifier::new();
        let mut state = TemperatureState::new();
        let entity = EntityId(1);
        let recorder = Recorder::default();

        notifier.flush(entity, TrackedKind::Player, &mut state, 1, &config(), &recorder);
        assert_eq!(notifier.flush(entity, TrackedKind::Player, &mut state, 2, &config(), &recorder), 0);

        let sent = notifier.flush(entity, TrackedKind::Player, &mut state, 60, &config(), &recorder);
        assert_eq!(sent, 1);

        notifier.force_temperatures();
        let messages = notifier.collect(entity, TrackedKind::Player, &mut state, 61, &config());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].target, SyncTarget::Recipient(entity));
        assert!(matches!(
            messages[0].payload,
            SyncPayload::Temperatures { instant: true, .. }
        ));

        let recorded = recorder.0.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(payload_channels(&recorded[1].payload).len(), 6);
    }
}
