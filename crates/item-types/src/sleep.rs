//! The `sleep-am` thing type: the morning entry of a sleep journal.

use once_cell::sync::Lazy;

use healthvault_thing::{FieldRule, FieldSpec, SchemaDescriptor, ThingTypeId, Value, ValueKind};

use crate::layouts::occurrence_layout;

pub const TYPE_ID: ThingTypeId = ThingTypeId::from_u128(0x11c52484_7f1a_11db_aeac_87d355d89593);
pub const ROOT: &str = "sleep-am";

pub const WHEN: &str = "when";
pub const BED_TIME: &str = "bed-time";
pub const WAKE_TIME: &str = "wake-time";
pub const SLEEP_MINUTES: &str = "sleep-minutes";
pub const SETTLING_MINUTES: &str = "settling-minutes";
/// Repeated [`occurrence`](crate::layouts::occurrence) entries.
pub const AWAKENING: &str = "awakening";
pub const MEDICATIONS: &str = "medications";
pub const WAKE_STATE: &str = "wake-state";

/// How the person felt on waking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeState {
    WideAwake = 1,
    Tired = 2,
    Sleepy = 3,
}

impl WakeState {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::WideAwake),
            2 => Some(Self::Tired),
            3 => Some(Self::Sleepy),
            _ => None,
        }
    }
}

impl From<WakeState> for Value {
    fn from(state: WakeState) -> Self {
        Self::Integer(state.code())
    }
}

static DESCRIPTOR: Lazy<SchemaDescriptor> = Lazy::new(|| {
    SchemaDescriptor::builder(TYPE_ID, ROOT)
        .name("Sleep Journal Morning")
        .field(FieldSpec::required(WHEN, ValueKind::HealthServiceDateTime))
        .field(FieldSpec::required(BED_TIME, ValueKind::ApproximateTime))
        .field(FieldSpec::required(WAKE_TIME, ValueKind::ApproximateTime))
        .field(
            FieldSpec::required(SLEEP_MINUTES, ValueKind::Integer)
                .with_rule(FieldRule::at_least(1)),
        )
        .field(
            FieldSpec::required(SETTLING_MINUTES, ValueKind::Integer)
                .with_rule(FieldRule::at_least(0)),
        )
        .field(FieldSpec::repeated(
            AWAKENING,
            ValueKind::Structure(occurrence_layout()),
        ))
        .field(FieldSpec::optional(MEDICATIONS, ValueKind::CodableValue))
        .field(
            FieldSpec::required(WAKE_STATE, ValueKind::Integer).with_rule(FieldRule::between(1, 3)),
        )
        .build()
});

pub fn descriptor() -> &'static SchemaDescriptor {
    &DESCRIPTOR
}
