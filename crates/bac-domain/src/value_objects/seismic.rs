//! Seismic bridge types
//!
//! Identifiers and records shared between the signal-detection domain and the
//! legacy relational schema it is bridged onto.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{GROUP_NAME_AMPLITUDE, GROUP_NAME_DETECTION, GROUP_NAME_FK, GROUP_NAME_ONSET};
use crate::error::Error;

/// Identifier of a signal-detection hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HypothesisId(pub Uuid);

impl HypothesisId {
    /// Generate a random identifier
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Legacy arrival id scoped by the legacy database account that owns it
///
/// The same `arid` may exist in several accounts (one per processing stage),
/// so the account is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountArrivalId {
    /// Legacy database account
    pub account: String,
    /// Legacy arrival id
    pub arid: i64,
}

impl AccountArrivalId {
    /// Create an account-scoped arrival id
    pub fn new(account: impl Into<String>, arid: i64) -> Self {
        Self {
            account: account.into(),
            arid,
        }
    }
}

impl fmt::Display for AccountArrivalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.account, self.arid)
    }
}

/// Legacy filter id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyFilterId(pub i64);

impl fmt::Display for LegacyFilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a filter definition is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterDefinitionUsage {
    /// Detection beam filtering
    Detection,
    /// FK spectrum filtering
    Fk,
    /// Onset time refinement
    Onset,
    /// Amplitude measurement
    Amplitude,
}

impl FilterDefinitionUsage {
    /// Map a legacy parameter group name to a usage
    pub fn from_group_name(group_name: &str) -> Option<Self> {
        match group_name.trim() {
            GROUP_NAME_DETECTION => Some(Self::Detection),
            GROUP_NAME_FK => Some(Self::Fk),
            GROUP_NAME_ONSET => Some(Self::Onset),
            GROUP_NAME_AMPLITUDE => Some(Self::Amplitude),
            _ => None,
        }
    }

    /// Legacy parameter group name of this usage
    pub fn group_name(self) -> &'static str {
        match self {
            Self::Detection => GROUP_NAME_DETECTION,
            Self::Fk => GROUP_NAME_FK,
            Self::Onset => GROUP_NAME_ONSET,
            Self::Amplitude => GROUP_NAME_AMPLITUDE,
        }
    }
}

impl FromStr for FilterDefinitionUsage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_group_name(s).ok_or_else(|| {
            Error::invalid_argument(format!("Unknown filter parameter group name: {s}"))
        })
    }
}

/// Pass band of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassBandType {
    /// Pass below the high cutoff
    LowPass,
    /// Pass above the low cutoff
    HighPass,
    /// Pass between the cutoffs
    BandPass,
    /// Reject between the cutoffs
    BandReject,
}

/// A filter definition as held by the legacy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Display name
    pub name: String,
    /// Free-form comments
    pub comments: Option<String>,
    /// Filter family (e.g. `IIR_BUTTERWORTH`)
    pub filter_type: String,
    /// Pass band
    pub pass_band: PassBandType,
    /// Low cutoff in Hz
    pub low_frequency_hz: Option<f64>,
    /// High cutoff in Hz
    pub high_frequency_hz: Option<f64>,
    /// Filter order
    pub order: u32,
    /// Whether the filter is causal (single pass)
    pub causal: bool,
}

/// Legacy record pairing a hypothesis with its arrival
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HypothesisArrivalRecord {
    /// Hypothesis id
    pub hypothesis: HypothesisId,
    /// Account-scoped arrival id
    pub arrival: AccountArrivalId,
}

/// Legacy join record relating an arrival to a filter through a parameter group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrivalFilterRecord {
    /// Account-scoped arrival id
    pub arrival: AccountArrivalId,
    /// Legacy parameter group name (`DETECT`, `FK`, `ONSET`, `MEASURE`)
    pub group_name: String,
    /// Referenced filter
    pub filter_id: LegacyFilterId,
}

/// Legacy record of one filter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinitionRecord {
    /// Legacy filter id
    pub filter_id: LegacyFilterId,
    /// The definition
    pub definition: FilterDefinition,
}

/// Legacy waveform id (`wfid`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyWaveformId(pub i64);

impl fmt::Display for LegacyWaveformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A version of a channel over a time span
///
/// Identifies the waveform data of one channel segment. The channel is a
/// version reference: its name plus the time the version became effective.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelSegmentDescriptor {
    /// Channel name (`STA.GROUP.CHAN`)
    pub channel_name: String,
    /// Effective time of the referenced channel version
    pub channel_effective_at: DateTime<Utc>,
    /// Segment start
    pub start_time: DateTime<Utc>,
    /// Segment end
    pub end_time: DateTime<Utc>,
}

impl ChannelSegmentDescriptor {
    /// Create a descriptor
    pub fn new(
        channel_name: impl Into<String>,
        channel_effective_at: DateTime<Utc>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            channel_effective_at,
            start_time,
            end_time,
        }
    }

    /// Check the span is ordered and the channel version predates its end
    ///
    /// # Errors
    ///
    /// `InvalidArgument` describing the violated ordering.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.start_time >= self.end_time {
            return Err(Error::invalid_argument(format!(
                "Channel segment {self} must start before it ends"
            )));
        }
        if self.channel_effective_at >= self.end_time {
            return Err(Error::invalid_argument(format!(
                "Channel segment {self} references a channel version effective after its end"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ChannelSegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} [{}, {}]",
            self.channel_name,
            self.channel_effective_at.to_rfc3339(),
            self.start_time.to_rfc3339(),
            self.end_time.to_rfc3339()
        )
    }
}

/// Legacy record relating a channel segment to one of its waveforms
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelSegmentWaveformRecord {
    /// Channel segment
    pub descriptor: ChannelSegmentDescriptor,
    /// Waveform backing (part of) the segment
    pub wfid: LegacyWaveformId,
}
